use crate::config::Config;
use crate::error::Error;
use crate::input::resolve_input;
use crate::output::Emitter;
use crate::text::apply_replacements;
use log::{debug, info};

/// Resolve input, apply substitutions and emit the result.
pub async fn run(config: &Config, emitter: &Emitter) -> Result<String, Error> {
    let input = resolve_input(config.input_text.as_deref(), config.input_file.as_deref()).await?;

    if input.is_empty() {
        info!("Input has no text, result will be an empty string");
        emitter.emit("").await?;
        return Ok(String::new());
    }

    debug!("Input string: \n{input}");

    if config.substitutions.is_empty() {
        info!("No substitutions specified, result will equal to input string");
        emitter.emit(&input).await?;
        return Ok(input);
    }

    debug!("Substitutions: \n{:?}", config.substitutions);

    let result = apply_replacements(&input, &config.substitutions, config.format_key());

    debug!("Result string: \n{result}");

    emitter.emit(&result).await?;
    Ok(result)
}
