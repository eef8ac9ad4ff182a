use clap::Parser;
use env_logger::Env;
use threatloom::cli::Args;
use threatloom::exporter::{load_model, RiskReport};
use threatloom::ui::TerminalReporter;
use threatloom::{apply_raa, list_built_in_rules, RuleEngine};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level()))
        .format_timestamp_millis()
        .init();

    log::info!("Threatloom starting with args: {:?}", args);

    let rules = list_built_in_rules();
    let reporter = TerminalReporter::new(args.quiet)?;

    if args.list_rules {
        reporter.finish();
        reporter.print_rules(&rules);
        return Ok(());
    }

    let Some(model_path) = args.model.as_deref() else {
        return Err("no model given (use --model)".into());
    };

    let mut model = load_model(model_path)?;
    let raa_intro = apply_raa(&mut model, &reporter);

    let engine = RuleEngine::new(args.engine_config());
    let risks = engine.evaluate(&model, &rules, &reporter)?;
    reporter.finish();

    if let Some(output) = &args.output {
        RiskReport::new(&model, &raa_intro, &risks).write_json(output)?;
    }

    reporter.print_summary(&model, &risks);
    Ok(())
}
