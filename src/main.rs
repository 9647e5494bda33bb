mod config;
mod text_injector;
use anyhow::{Context, Result};
use config::AppConfig;
use log::{error, info, warn};
use std::{
    fs,
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use swipetype::{
    compose::{Composer, Edit},
    stream::{PointerListener, Signal},
    suggest::{HttpSuggestionService, SuggestionPipeline, SuggestionUpdate},
    Dictionary, Keyboard, WordScorer,
};
use text_injector::TextInjector;

fn main() -> Result<()> {
    simple_logger::SimpleLogger::new()
        .init()
        .context("Failed to initialize logger")?;

    info!("Starting SwipeType");

    let config = AppConfig::load()?;
    info!("Loaded config: {:?}", config);

    let dictionary = match &config.dictionary_path {
        Some(path) => Dictionary::load(path)?,
        None => {
            info!("Using built-in dictionary");
            Dictionary::builtin()
        }
    };

    let mut keyboard = Keyboard::new(
        config.surface.width,
        config.surface.height,
        Arc::new(dictionary),
        WordScorer::new(config.scoring),
    )
    .context("Failed to build keyboard layout")?
    .with_double_tap_window(config.shift_double_tap);

    let mut suggestions = match &config.suggestions.endpoint {
        Some(endpoint) => {
            let service = HttpSuggestionService::new(endpoint.as_str(), config.suggestions.timeout)?;
            let style = config
                .suggestions
                .writing_style_path
                .as_ref()
                .map(|path| {
                    fs::read_to_string(path)
                        .with_context(|| format!("Failed to read {}", path.display()))
                })
                .transpose()?;
            info!("Suggestions enabled via {}", endpoint);
            Some(
                SuggestionPipeline::new(Arc::new(service), config.suggestions.debounce)
                    .with_tone(config.suggestions.tone)
                    .with_writing_style(style),
            )
        }
        None => None,
    };

    let injector = TextInjector::new()?;
    let mut composer = Composer::new();
    let mut listener = PointerListener::new(config.surface)?;
    let accept_key = config.suggestions.accept_key;
    let mut shown: Vec<String> = Vec::new();

    listener.listen(|signal| {
        let now = clock();

        if let Signal::Pointer(event) = signal {
            if let Some(output) = keyboard.handle(event) {
                info!("Key output: {:?}", output);
                let edit = if !shown.is_empty() && accept_key.as_ref() == Some(&output) {
                    let chosen = std::mem::take(&mut shown);
                    info!("Accepted suggestion: {}", chosen[0]);
                    Some(composer.accept(&chosen[0]))
                } else {
                    composer.apply(&output)
                };

                if let Some(edit) = edit {
                    if let Err(e) = injector.apply(&edit) {
                        error!("Injection failed: {:#}", e);
                    }
                    if let Edit::Submit(message) = &edit {
                        info!("Message sent: {}", message);
                    }
                    if let Some(pipeline) = suggestions.as_mut() {
                        pipeline.text_changed(composer.text(), now);
                    }
                }
            }
        }

        if let Some(pipeline) = suggestions.as_mut() {
            match pipeline.tick(now) {
                Some(SuggestionUpdate::Ready(list)) => {
                    for (i, suggestion) in list.iter().enumerate() {
                        info!("Suggestion {}: {}", i + 1, suggestion);
                    }
                    shown = list;
                }
                Some(SuggestionUpdate::Cleared) => {
                    if !shown.is_empty() {
                        info!("Suggestions cleared");
                    }
                    shown.clear();
                }
                Some(SuggestionUpdate::Failed(message)) => {
                    warn!("No suggestions available: {}", message);
                    shown.clear();
                }
                None => {}
            }
        }
    })?;

    Ok(())
}

fn clock() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}
