use crate::cli::ReduceArgs;
use crate::config::Config;
use crate::output::{load_run_output, write_stratified};
use crate::reducer::stratify;
use tracing::info;

pub fn execute(args: ReduceArgs) -> anyhow::Result<()> {
    let config = Config::load_or_default(&args.config)?;
    let input = args.input.unwrap_or(config.output);
    let out_dir = args.out_dir.unwrap_or(config.reduce_dir);

    let run = load_run_output(&input)?;
    info!(
        "Loaded {} perspectives from {:?}",
        run.perspectives.len(),
        input
    );

    let result = stratify(&run.perspectives);
    for path in write_stratified(&out_dir, &result)? {
        info!("Wrote {:?}", path);
    }

    info!(
        "Selected {} of {} perspectives (leftist {}, common {}, rightist {})",
        result.len(),
        run.perspectives.len(),
        result.leftist.len(),
        result.common.len(),
        result.rightist.len()
    );
    Ok(())
}
