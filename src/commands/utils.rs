use crate::tools::{registry, AnalysisTool};
use crate::utils::config::SCHEMA_VERSION;

/// List the analysis tools in run order
pub fn display_tools() {
    println!("Analysis tools (in run order):");
    println!();
    for tool in registry() {
        let unit = tool
            .summary()
            .map(|(key, kind)| format!(" [compared as '{key}', {kind}]"))
            .unwrap_or_default();
        let switch = if tool.opt_in() { "--tool-" } else { "--no-" };
        println!("  {:<30} {}{}{}", tool.name(), switch, tool.id(), unit);
        println!("      {}", tool.describe());
    }
}

/// Display version information
pub fn display_version() {
    println!("Build Trace Studio v{}", env!("CARGO_PKG_VERSION"));
    println!("Comparison Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Build-time analysis for clang -ftime-trace output.");
}
