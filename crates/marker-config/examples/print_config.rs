/// Example program to print the loaded configuration
///
/// Run with: cargo run -p marker-config --example print_config

fn main() {
    // Load configuration from marker.toml
    let config = marker_config::MarkerConfig::load();

    println!("=== Marker Configuration ===\n");

    println!("Directive Defaults:");
    println!("  Direction: {}", config.defaults.direction);
    println!("  Theme: {}", config.defaults.theme);
    println!("  Scroll Start: {}", config.defaults.scroll_start);
    println!("  Stagger Start: {}", config.defaults.stagger_start);
    println!("  Stagger (ms): {}", config.defaults.stagger_ms);
    println!();

    println!("Bar Settings:");
    println!("  Duration (s): {}", config.bar.duration_seconds);
    println!("  Ease: {}", config.bar.ease);
    println!();

    println!("Bootstrap Settings:");
    println!("  Poll Interval (ms): {}", config.bootstrap.poll_interval_ms);
    println!("  Timeout (ms): {}", config.bootstrap.timeout_ms);
    println!("  Reduced Motion: {:?}", config.bootstrap.reduced_motion);
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
