use anyhow::Result;
use std::io::BufRead;
use std::sync::Arc;
use tracing::{info, warn};

use ui_translate::config::Config;
use ui_translate::gemini::GeminiClient;
use ui_translate::i18n::LanguageRegistry;
use ui_translate::preference::LanguagePreference;
use ui_translate::{Translator, TranslatorOptions};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when variables come from the environment)
    let _ = dotenvy::dotenv();

    // Initialize logging (stderr, so stdout carries only translations)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ui_translate=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;

    // Target language: first argument, else the saved preference
    let preference = LanguagePreference::open(&config.preference_file);
    let target_language = match std::env::args().nth(1) {
        Some(code) => {
            let registry = LanguageRegistry::get();
            if registry.is_enabled(&code) {
                if let Err(e) = preference.change(&code) {
                    warn!("Could not save language preference: {:#}", e);
                }
            } else {
                let listed: Vec<_> = registry.list_enabled().iter().map(|l| l.code).collect();
                warn!(
                    "'{}' is not a listed language ({}); using it without saving",
                    code,
                    listed.join(", ")
                );
            }
            code
        }
        None => preference.current().code().to_string(),
    };
    info!("Translating stdin to {}", target_language);

    let remote = GeminiClient::from_config(reqwest::Client::new(), &config);
    let translator = Translator::new(Arc::new(remote), TranslatorOptions::from_config(&config));

    let lines = tokio::task::spawn_blocking(|| {
        std::io::stdin()
            .lock()
            .lines()
            .collect::<std::io::Result<Vec<String>>>()
    })
    .await??;

    for line in &lines {
        println!("{}", translator.translate(line, &target_language).await);
    }

    let report = translator.metrics().report();
    info!(
        "Done: {} cache hits, {} remote calls, {} fallbacks",
        report.cache_hits, report.api_calls, report.fallbacks
    );
    Ok(())
}
