use crate::cli::ScaffoldArgs;
use crate::scaffold::{build_scaffold, group_by_band, perspective_count};
use anyhow::bail;

pub fn execute(args: ScaffoldArgs) -> anyhow::Result<()> {
    let count = match (args.count, args.significance) {
        (Some(count), _) => count,
        (None, Some(s)) if (0.0..=1.0).contains(&s) => perspective_count(s),
        (None, Some(s)) => bail!("Significance must be within [0, 1] (got {})", s),
        (None, None) => bail!("Either --significance or --count is required"),
    };

    let slots = build_scaffold(count)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&slots)?);
        return Ok(());
    }

    println!("\n=== Scaffold: {} perspectives ===\n", slots.len());
    for (band, group) in group_by_band(&slots) {
        let biases: Vec<_> = group.iter().map(|s| format!("{:.4}", s.bias_x)).collect();
        println!("  {:<7} {:>3}  {}", band, group.len(), biases.join(" "));
    }
    println!();
    Ok(())
}
