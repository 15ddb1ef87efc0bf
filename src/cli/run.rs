use crate::cli::RunArgs;
use crate::config::{Config, ProviderKind};
use crate::output::{write_run_output, write_run_report, write_stratified, RunInput, RunOutput};
use crate::provider::create_generator;
use crate::reducer::stratify;
use crate::runner::{GenerationClient, PerspectivePipeline, RunOptions};
use crate::scaffold::build_scaffold;
use std::sync::atomic::Ordering;
use tokio::sync::mpsc;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

pub async fn execute(args: RunArgs) -> anyhow::Result<()> {
    let mut config = Config::load_or_default(&args.config)?;

    // Apply CLI overrides
    if let Some(provider) = args.provider {
        config.provider = provider;
    }
    if let Some(model) = &args.model {
        match config.provider {
            ProviderKind::Http => config.providers.http.model = model.clone(),
            ProviderKind::ClaudeCli => config.providers.claude_cli.model = model.clone(),
        }
    }

    let mut options = RunOptions::from_config(&config);
    if let Some(input) = &args.input {
        options.input = input.clone();
    }
    if let Some(output) = &args.output {
        options.output = output.clone();
    }
    if let Some(temperature) = args.temperature {
        options.temperature = temperature;
    }
    options.endpoint = args.endpoint.clone();
    options.apply_to(&mut config);

    config.validate()?;

    let run_id = Uuid::new_v4().simple().to_string();
    let span = info_span!("run", id = %&run_id[..8]);
    run(config, options, args).instrument(span).await
}

async fn run(config: Config, mut options: RunOptions, args: RunArgs) -> anyhow::Result<()> {
    let input = RunInput::load(&options.input)?;
    let slots = build_scaffold(input.perspective_count())?;
    info!(
        "Statement {:?} at significance {:.2}: {} perspectives",
        input.statement,
        input.significance,
        slots.len()
    );

    let generator = create_generator(&config)?;
    info!("Using {} generator", generator.name());
    let client = GenerationClient::new(generator, config.retry.clone());
    let pipeline = PerspectivePipeline::new(config.clone(), client);

    // Stream band updates as JSON lines from a separate task
    let printer = if args.stream {
        let (tx, mut rx) = mpsc::unbounded_channel();
        options.stream = Some(tx);
        Some(tokio::spawn(async move {
            while let Some(update) = rx.recv().await {
                match serde_json::to_string(&update) {
                    Ok(line) => println!("{}", line),
                    Err(e) => warn!("Failed to encode band update: {}", e),
                }
            }
        }))
    } else {
        None
    };

    let cancel = options.cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current band");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    let result = pipeline
        .run(&input.statement, input.context.as_deref(), &slots, &options)
        .await;

    // Closing the sender lets the printer drain and finish
    drop(options.stream.take());
    if let Some(printer) = printer {
        if let Err(e) = printer.await {
            warn!("Stream printer failed: {}", e);
        }
    }

    let report = result?;

    let output = RunOutput {
        input: input.statement.clone(),
        perspectives: report.perspectives.clone(),
    };
    write_run_output(&options.output, &output)?;
    info!(
        "Wrote {} perspectives to {:?}",
        output.perspectives.len(),
        options.output
    );

    if let Some(path) = &args.report {
        write_run_report(path, &input, &report)?;
        info!("Wrote report: {:?}", path);
    }

    if args.reduce {
        let stratified = stratify(&report.perspectives);
        write_stratified(&config.reduce_dir, &stratified)?;
        info!(
            "Wrote {} stratified perspectives to {:?}",
            stratified.len(),
            config.reduce_dir
        );
    }

    let totals = report.totals();
    info!(
        "Completed in {:.1}s: {} accepted, {} repaired, {} fallbacks, {} parse retries",
        report.total_duration.as_secs_f64(),
        totals.accepted,
        totals.repaired,
        totals.fallbacks,
        totals.parse_retries
    );

    Ok(())
}
