use pixel_pomodoro_core::{format_clock, Config};

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let session = config.session_config()?;
    let cycle = session.cycle();

    if json {
        println!("{}", serde_json::to_string_pretty(&cycle)?);
        return Ok(());
    }

    for (i, step) in cycle.iter().enumerate() {
        println!(
            "{:>2}. {:<12} {}",
            i + 1,
            step.phase.label(),
            format_clock(step.duration_secs)
        );
    }
    println!("    {:<12} {}", "Total", format_clock(session.cycle_secs()));
    Ok(())
}
