/// Example program to print the loaded transition configuration
///
/// Run with: cargo run -p rune-config --example print_config

fn main() {
    let config = rune_config::TransitionConfig::load();

    println!("=== Rune Transition Configuration ===\n");

    println!("Transitions:");
    println!("  Enabled: {}", config.transitions.enabled);
    println!("  No Intro: {}", config.transitions.no_intro);
    println!("  No Outro: {}", config.transitions.no_outro);
    println!("  Nested: {}", config.transitions.nested);
    println!();

    println!("Driver:");
    println!("  Frame ms: {}", config.driver.frame_ms);
    println!();

    println!("Diagnostics:");
    println!("  Warn once: {}", config.diagnostics.warn_once);
    println!();

    match toml::to_string_pretty(&config) {
        Ok(toml_str) => {
            println!("=== Serialized Configuration ===");
            println!("{}", toml_str);
        }
        Err(e) => {
            eprintln!("Failed to serialize config: {}", e);
        }
    }
}
