use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("lumpy")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Save web articles for offline reading")
        .arg(clap::arg!(<INPUT> "URL to fetch, local HTML file, or '-' for stdin"))
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (json, html, text)")
                .value_name("FORMAT")
                .default_value("json")
                .value_parser(["json", "html", "text"]),
        )
        .arg(clap::arg!(--base_url <URL> "Page URL for file or stdin input").value_name("URL"))
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("10"))
        .arg(clap::arg!(--user_agent <UA> "Custom User-Agent for HTTP requests").value_name("UA"))
        .arg(
            clap::arg!(--char_threshold <NUM> "Text length below which a relaxed readability attempt runs")
                .default_value("500"),
        )
        .arg(clap::arg!(--no_images "Strip images from extracted content"))
        .arg(clap::arg!(--og_image "Fill imageUrl from og:image for readable pages too"))
        .arg(clap::arg!(-v --verbose "Print progress and a record summary to stderr"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "lumpy", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "lumpy", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "lumpy", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "lumpy", &completions_dir).unwrap();
}
