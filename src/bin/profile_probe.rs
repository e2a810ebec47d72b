use std::path::Path;

use candidate_scout::core::profile_page::{self, CONTENT_BOX, RESUME_HEADER, SIGN_IN_FORM};

/// Prints the fields scraped from a saved profile page, for checking selectors offline.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: profile_probe <path-to-profile.html>");
        std::process::exit(1);
    }

    let path = &args[1];
    if !Path::new(path).exists() {
        eprintln!("File not found: {path}");
        std::process::exit(2);
    }

    let html = tokio::fs::read_to_string(path).await?;

    if profile_page::has_landmark(&html, SIGN_IN_FORM) {
        eprintln!("{path} is a sign-in page, not a profile");
        std::process::exit(3);
    }

    for landmark in [RESUME_HEADER, CONTENT_BOX] {
        if !profile_page::has_landmark(&html, landmark) {
            eprintln!("warning: landmark {landmark} not found in {path}");
        }
    }

    let scraped = profile_page::scrape_profile(&html);
    println!("{}", serde_json::to_string_pretty(&scraped)?);
    Ok(())
}
