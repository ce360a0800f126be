use elevatorsim::{init, print, Simulation};


fn main() {
    if let Err(e) = run() {
        print::err(format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args = init::parse_args(std::env::args().skip(1))?;
    if args.help {
        init::print_help();
        return Ok(());
    }

    // Vanleg køyring startar her
    print::info(format!(
        "Starting simulation: {} floors, {} persons, {} s",
        args.config.floor_names.len(),
        args.config.persons,
        args.config.duration_secs
    ));
    let simulation = Simulation::new(args.config, args.trace)?;
    simulation.run()?;
    Ok(())
}
