//! List strategies command.

use anyhow::Result;
use signals_strategies::StrategyRegistry;

pub fn run() -> Result<()> {
    let registry = StrategyRegistry::new();

    println!("Available Strategies");
    println!("═══════════════════════════════════════════════════════════");
    println!();

    for info in registry.list() {
        let strategy = registry.create_default(&info.key)?;
        let metadata = strategy.metadata();

        println!("  {} ({})", info.name, info.key);
        println!("  ───────────────────────────────────────────────────────");
        println!("  {}", info.description);
        println!(
            "  timeframe {}  stoploss {:.1}%  startup {}",
            metadata.timeframe,
            metadata.stoploss * 100.0,
            metadata.startup_candle_count
        );
        for pair in strategy.informative_pairs() {
            println!("  informative {}", pair);
        }
        println!("  defaults: {}", info.default_config);
        println!();
    }

    println!("Use --strategy <key> to select a strategy, or --rules <file> for a declarative one.");

    Ok(())
}
