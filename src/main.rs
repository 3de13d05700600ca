use clap::{Arg, ArgAction, Command};
use std::sync::Arc;
use word_relay::{
    AdmissionPolicy, Dictionary, DispatchConfig, LibreTranslateProvider, MachineTranslator,
    MockMode, MockTranslator, TranslationRelay, WordNormalizer,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("word-relay")
        .version("0.1.0")
        .about("Spell-correct and translate a batch of English words")
        .arg(
            Arg::new("target-language")
                .help("Target language code (e.g., es, fr, de)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("words")
                .help("Words to translate")
                .required(true)
                .num_args(1..)
                .index(2),
        )
        .arg(
            Arg::new("url")
                .long("url")
                .short('u')
                .help("LibreTranslate endpoint (default: $LIBRETRANSLATE_URL or localhost:5001)"),
        )
        .arg(
            Arg::new("dictionary")
                .long("dictionary")
                .short('d')
                .help("Word list file (default: system British English list, else bundled)"),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .short('m')
                .help("Use mock translator instead of LibreTranslate")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Show normalized words and the admission policy")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let target_language = matches
        .get_one::<String>("target-language")
        .ok_or("missing target language")?;
    let words: Vec<String> = matches
        .get_many::<String>("words")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let verbose = matches.get_flag("verbose");

    let config = DispatchConfig::from_env()?;

    let translator: Arc<dyn MachineTranslator> = if matches.get_flag("mock") {
        Arc::new(MockTranslator::new(MockMode::Suffix))
    } else if let Some(url) = matches.get_one::<String>("url") {
        Arc::new(LibreTranslateProvider::with_timeout(url.as_str(), config.call_timeout)?)
    } else {
        Arc::new(LibreTranslateProvider::from_env_with_timeout(config.call_timeout)?)
    };

    let dictionary = match matches.get_one::<String>("dictionary") {
        Some(path) => Dictionary::from_file(path, Dictionary::DEFAULT_MAX_EDIT_DISTANCE)?,
        None => Dictionary::system_or_bundled(Dictionary::DEFAULT_MAX_EDIT_DISTANCE),
    };
    let normalizer = WordNormalizer::new(Arc::new(dictionary));

    if verbose {
        let normalized = normalizer.normalize(&words);
        let policy = AdmissionPolicy::for_batch(normalized.len(), &config);
        println!("📝 Input: {:?}", words);
        println!("✅ Normalized: {:?}", normalized);
        println!(
            "📦 Policy: max_concurrent={}, gap={:?}, ceiling={}",
            policy.max_concurrent, policy.min_inter_service_gap, policy.queue_ceiling
        );
        println!("🌍 Provider: {}", translator.provider_name());
        println!();
    }

    let relay = TranslationRelay::new(translator, Arc::new(normalizer), config);
    match relay.translate_words(&words, target_language).await {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            Err(e.into())
        }
    }
}
