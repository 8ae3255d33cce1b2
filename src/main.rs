use std::path::PathBuf;

use clap::Parser;

mod cli;
mod config;
mod generate;
mod recommend;
#[cfg(test)]
mod tests;
mod vocabulary;
mod web;

use config::Config;
use generate::SentenceGenerator;
use recommend::{Embedder, EmbeddingModel, RecommendService};
use vocabulary::Vocabulary;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = cli::Args::parse();

    let base_path = config::base_path()?;
    let config = Config::load_with(&base_path);

    match args.command {
        cli::Command::Daemon { vocabulary } => {
            let service = build_service(&config, vocabulary)?;

            let generator = SentenceGenerator::new(config.generation.clone());
            if !generator.check_connection() {
                log::warn!(
                    "generation backend at {} is not reachable; /api/generate will fail until it is up",
                    config.generation.base_url
                );
            }

            web::start_daemon(service, generator, config);
            Ok(())
        }

        cli::Command::Initial { k, vocabulary } => {
            // Starters need only the vocabulary, so skip the model load.
            let vocabulary = Vocabulary::load(&vocabulary_path(&config, vocabulary))?;
            let words = recommend::initial_words(&vocabulary, k.unwrap_or(config.recommend.default_k));
            println!("{}", serde_json::to_string_pretty(&words).unwrap());
            Ok(())
        }

        cli::Command::Recommend {
            word,
            context,
            exclude,
            k,
            diverse,
            vocabulary,
        } => {
            let service = build_service(&config, vocabulary)?;
            let k = k.unwrap_or(config.recommend.default_k);
            let mut rng = rand::rng();

            let recommendations = if diverse {
                service.recommend_diverse(k, &exclude, &mut rng)?
            } else if !service.word_exists(&word) {
                log::warn!("'{word}' is not in the vocabulary, printing starting words");
                service.initial_words(k)
            } else {
                service.recommend(&word, k, &context, &exclude, &mut rng)?
            };

            println!("{}", serde_json::to_string_pretty(&recommendations).unwrap());
            Ok(())
        }

        cli::Command::Generate { words } => {
            let generator = SentenceGenerator::new(config.generation.clone());
            let sentence = generator.generate_sentence(&words)?;
            println!("{sentence}");
            Ok(())
        }
    }
}

fn vocabulary_path(config: &Config, override_path: Option<String>) -> PathBuf {
    override_path
        .map(PathBuf::from)
        .unwrap_or_else(|| config.vocabulary_path())
}

/// Load the vocabulary, bring up the embedding model, and build the
/// similarity index. Blocking; the index must be ready before serving.
fn build_service(
    config: &Config,
    vocabulary_override: Option<String>,
) -> anyhow::Result<RecommendService> {
    let vocabulary = Vocabulary::load(&vocabulary_path(config, vocabulary_override))?;

    log::info!("loading embedding model '{}'", config.embedding.model);
    let embedder = EmbeddingModel::new(
        &config.embedding.model,
        PathBuf::from(config.base_path()),
    )?;
    log::info!(
        "embedding model '{}' ready ({} dimensions)",
        embedder.name(),
        embedder.dimensions()
    );

    let service = RecommendService::new(vocabulary, Box::new(embedder), &config.recommend);
    service.build_index()?;

    Ok(service)
}
