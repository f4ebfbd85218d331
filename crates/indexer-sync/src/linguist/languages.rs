//! Built-in language table

use super::{Language, LanguageKind};

use super::LanguageKind::{Data, Markup, Programming, Prose};

const fn lang(
    name: &'static str,
    kind: LanguageKind,
    extensions: &'static [&'static str],
    filenames: &'static [&'static str],
) -> Language {
    Language {
        name,
        kind,
        extensions,
        filenames,
    }
}

#[rustfmt::skip]
pub static LANGUAGES: &[Language] = &[
    lang("Ada", Programming, &[".adb", ".ada", ".ads"], &[]),
    lang("Assembly", Programming, &[".asm", ".nasm"], &[]),
    lang("Batchfile", Programming, &[".bat", ".cmd"], &[]),
    lang("C", Programming, &[".c", ".h", ".cats", ".idc"], &[]),
    lang("C#", Programming, &[".cs", ".cake", ".csx"], &[]),
    lang("C++", Programming, &[".cpp", ".c++", ".cc", ".cp", ".cxx", ".hh", ".hpp", ".hxx", ".inl", ".ipp", ".tcc", ".tpp"], &[]),
    lang("CMake", Programming, &[".cmake"], &["CMakeLists.txt"]),
    lang("CSS", Markup, &[".css"], &[]),
    lang("Clojure", Programming, &[".clj", ".cljc", ".cljs", ".cljx", ".edn"], &["riemann.config"]),
    lang("CoffeeScript", Programming, &[".coffee", "._coffee", ".cjsx", ".iced"], &["Cakefile"]),
    lang("Common Lisp", Programming, &[".lisp", ".asd", ".lsp", ".ny"], &[]),
    lang("D", Programming, &[".d", ".di"], &[]),
    lang("Dart", Programming, &[".dart"], &[]),
    lang("Diff", Data, &[".diff", ".patch"], &[]),
    lang("Dockerfile", Programming, &[".dockerfile"], &["Dockerfile"]),
    lang("Elixir", Programming, &[".ex", ".exs"], &["mix.lock"]),
    lang("Elm", Programming, &[".elm"], &[]),
    lang("Emacs Lisp", Programming, &[".el", ".emacs"], &[".emacs", ".spacemacs", "_emacs"]),
    lang("Erlang", Programming, &[".erl", ".escript", ".hrl", ".xrl", ".yrl"], &["rebar.config", "rebar.lock"]),
    lang("F#", Programming, &[".fs", ".fsi", ".fsx"], &[]),
    lang("Fortran", Programming, &[".f90", ".f", ".f03", ".f08", ".f77", ".f95", ".for", ".fpp"], &[]),
    lang("Gettext Catalog", Prose, &[".po", ".pot"], &[]),
    lang("Go", Programming, &[".go"], &[]),
    lang("Gradle", Data, &[".gradle"], &[]),
    lang("GraphQL", Data, &[".graphql", ".gql"], &[]),
    lang("Groovy", Programming, &[".groovy", ".grt", ".gtpl", ".gvy"], &["Jenkinsfile"]),
    lang("HAML", Markup, &[".haml"], &[]),
    lang("HTML", Markup, &[".html", ".htm", ".xht", ".xhtml"], &[]),
    lang("HTML+ERB", Markup, &[".erb", ".rhtml"], &[]),
    lang("Haskell", Programming, &[".hs", ".hsc", ".lhs"], &[]),
    lang("INI", Data, &[".ini", ".cfg", ".prefs", ".properties"], &[".editorconfig", ".gitconfig"]),
    lang("JSON", Data, &[".json", ".geojson", ".jsonl", ".topojson", ".webmanifest"], &[".arcconfig", ".jshintrc", "composer.lock"]),
    lang("Java", Programming, &[".java"], &[]),
    lang("JavaScript", Programming, &[".js", "._js", ".cjs", ".es6", ".jsx", ".mjs"], &["Jakefile"]),
    lang("Julia", Programming, &[".jl"], &[]),
    lang("Kotlin", Programming, &[".kt", ".ktm", ".kts"], &[]),
    lang("Less", Markup, &[".less"], &[]),
    lang("Lua", Programming, &[".lua", ".nse", ".rockspec", ".wlua"], &[".luacheckrc"]),
    lang("Makefile", Programming, &[".mak", ".make", ".mk", ".mkfile"], &["BSDmakefile", "GNUmakefile", "Kbuild", "Makefile", "Makefile.am", "Makefile.in", "makefile"]),
    lang("Markdown", Prose, &[".md", ".markdown", ".mdown", ".mkd", ".mkdn", ".ronn"], &["contents.lr"]),
    lang("Nginx", Data, &[".nginxconf", ".vhost"], &["nginx.conf"]),
    lang("Nix", Programming, &[".nix"], &[]),
    lang("OCaml", Programming, &[".ml", ".eliom", ".eliomi", ".ml4", ".mli", ".mll", ".mly"], &[]),
    lang("Objective-C", Programming, &[".m"], &[]),
    lang("Objective-C++", Programming, &[".mm"], &[]),
    lang("PHP", Programming, &[".php", ".phps", ".phpt", ".php3", ".php4", ".php5", ".phtml"], &[".php_cs", ".php_cs.dist", "Phakefile"]),
    lang("Perl", Programming, &[".pl", ".al", ".perl", ".ph", ".plx", ".pm", ".psgi"], &["Makefile.PL", "cpanfile"]),
    lang("PowerShell", Programming, &[".ps1", ".psd1", ".psm1"], &[]),
    lang("Protocol Buffer", Data, &[".proto"], &[]),
    lang("Python", Programming, &[".py", ".gyp", ".pyi", ".pyw", ".pyx", ".wsgi"], &["BUILD", "SConscript", "SConstruct", "Snakefile", "WORKSPACE", "wscript"]),
    lang("R", Programming, &[".r", ".rd", ".rsx"], &[".Rprofile"]),
    lang("Racket", Programming, &[".rkt", ".rktd", ".rktl", ".scrbl"], &[]),
    lang("Ruby", Programming, &[".rb", ".builder", ".gemspec", ".god", ".jbuilder", ".mspec", ".podspec", ".rabl", ".rake", ".rbuild", ".rbw", ".rbx", ".ru", ".ruby", ".thor", ".watchr"], &[".irbrc", ".pryrc", "Appraisals", "Berksfile", "Brewfile", "Gemfile", "Gemfile.lock", "Guardfile", "Podfile", "Rakefile", "Thorfile", "Vagrantfile"]),
    lang("Rust", Programming, &[".rs"], &[]),
    lang("SCSS", Markup, &[".scss"], &[]),
    lang("SQL", Data, &[".sql", ".ddl", ".prc", ".tab", ".udf", ".viw"], &[]),
    lang("Sass", Markup, &[".sass"], &[]),
    lang("Scala", Programming, &[".scala", ".sbt", ".sc"], &[]),
    lang("Scheme", Programming, &[".scm", ".sld", ".sls", ".sps", ".ss"], &[]),
    lang("Shell", Programming, &[".sh", ".bash", ".bats", ".command", ".ksh", ".tmux", ".tool", ".zsh"], &[".bash_logout", ".bash_profile", ".bashrc", ".profile", ".zshrc", "PKGBUILD"]),
    lang("Swift", Programming, &[".swift"], &[]),
    lang("TOML", Data, &[".toml"], &["Cargo.lock", "Gopkg.lock", "Pipfile"]),
    lang("TeX", Markup, &[".tex", ".cls", ".dtx", ".ins", ".ltx", ".sty"], &[]),
    lang("Terraform", Programming, &[".tf", ".tfvars", ".hcl"], &[]),
    lang("Text", Prose, &[".txt", ".fr", ".nb", ".ncl", ".no"], &["COPYING", "INSTALL", "LICENSE", "NEWS", "README.me", "click.me", "delete.me", "keep.me", "read.me", "test.me"]),
    lang("TypeScript", Programming, &[".ts", ".tsx"], &[]),
    lang("Vim script", Programming, &[".vim", ".vmb"], &[".gvimrc", ".nvimrc", ".vimrc", "_vimrc", "gvimrc", "nvimrc", "vimrc"]),
    lang("Vue", Markup, &[".vue"], &[]),
    lang("XML", Data, &[".xml", ".csproj", ".plist", ".svg", ".xsd", ".xsl", ".xslt"], &[".classpath", ".project", "Web.config", "packages.config"]),
    lang("YAML", Data, &[".yml", ".yaml", ".reek", ".rviz", ".syntax", ".yaml-tmlanguage"], &[".clang-format", ".gemrc", "glide.lock"]),
];
