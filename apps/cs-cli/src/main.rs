//! costep demo CLI: built-in coupled scenarios over the analytic models.

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cs_backend::ModelDescriptor;
use cs_core::timing::Timer;
use cs_core::{Port, Value};
use cs_master::{Master, MasterOptions};
use cs_models::{CyclingRelay, FirstOrderLag, GainModel, ModelCatalog, RampSource};
use cs_trace::{RunStore, TraceManifest, TraceRecorder, compute_run_id};

#[derive(Parser)]
#[command(name = "cs-cli")]
#[command(about = "costep CLI - co-simulation master demo scenarios", long_about = None)]
struct Cli {
    /// Enable debug-level stepping logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ramp -> gain -> lag chain, plus an externally driven reference lag
    DemoCoupled {
        /// Number of communication steps to run
        #[arg(long, default_value_t = 20)]
        steps: usize,
        /// Communication step in seconds
        #[arg(long, default_value_t = 0.25)]
        dt: f64,
        /// Directory to store the sampled trace in (optional)
        #[arg(long)]
        trace_dir: Option<PathBuf>,
    },
    /// Predictive relay heating a lag plant, shut down by a one-shot event
    DemoThermostat {
        /// Number of communication steps to run
        #[arg(long, default_value_t = 40)]
        steps: usize,
        /// Communication step in seconds
        #[arg(long, default_value_t = 0.5)]
        dt: f64,
        /// Relay switching period in seconds
        #[arg(long, default_value_t = 3.0)]
        period: f64,
        /// Plant level that triggers the shutdown event
        #[arg(long, default_value_t = 2.0)]
        limit: f64,
        /// Directory to store the sampled trace in (optional)
        #[arg(long)]
        trace_dir: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let result = match cli.command {
        Commands::DemoCoupled {
            steps,
            dt,
            trace_dir,
        } => run_demo_coupled(steps, dt, trace_dir),
        Commands::DemoThermostat {
            steps,
            dt,
            period,
            limit,
            trace_dir,
        } => run_demo_thermostat(steps, dt, period, limit, trace_dir),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Step the frozen master `steps` times, sampling and printing the watched
/// ports after each communication instant.
fn run_and_print(
    master: &mut Master,
    recorder: &mut TraceRecorder,
    watched: &[Port],
    steps: usize,
    dt: f64,
) -> Result<(), Box<dyn Error>> {
    print!("{:>8}", "time");
    for column in recorder.columns() {
        print!("  {:>12}", column.label);
    }
    println!();

    recorder.sample(master)?;
    print_row(master, watched)?;

    for i in 1..=steps {
        let target = master.options().start_time + i as f64 * dt;
        master.advance(target)?;
        recorder.sample(master)?;
        print_row(master, watched)?;
    }
    Ok(())
}

fn print_row(master: &Master, watched: &[Port]) -> Result<(), Box<dyn Error>> {
    print!("{:>8.3}", master.current_time());
    for port in watched {
        match master.get(port)? {
            Value::Real(v) => print!("  {:>12.4}", v),
            other => print!("  {:>12}", other),
        }
    }
    println!();
    Ok(())
}

fn save_trace(
    recorder: TraceRecorder,
    descriptors: &[ModelDescriptor],
    scenario_id: &str,
    dt: f64,
    trace_dir: PathBuf,
) -> Result<(), Box<dyn Error>> {
    let run_id = compute_run_id(descriptors, dt, env!("CARGO_PKG_VERSION"));
    let (columns, records) = recorder.into_parts();
    let manifest = TraceManifest::new(run_id.clone(), scenario_id, dt, columns);
    let store = RunStore::new(trace_dir)?;
    store.save_run(&manifest, &records)?;
    println!("trace saved as run {run_id}");
    Ok(())
}

fn run_demo_coupled(
    steps: usize,
    dt: f64,
    trace_dir: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let timer = Timer::start("demo-coupled");

    let mut catalog = ModelCatalog::new();
    catalog.register("demo:ramp", |d| {
        Ok(Box::new(RampSource::new(d.name.as_str(), 0.0, 1.0)))
    });
    catalog.register("demo:gain-2x", |d| Ok(Box::new(GainModel::new(d.name.as_str(), 2.0))));
    catalog.register("demo:lag", |d| {
        Ok(Box::new(FirstOrderLag::new(d.name.as_str(), 2.0)))
    });

    let descriptors = vec![
        ModelDescriptor::fixed_step("demo:ramp", "stim"),
        ModelDescriptor::fixed_step("demo:gain-2x", "amp"),
        ModelDescriptor::fixed_step("demo:lag", "plant"),
        ModelDescriptor::fixed_step("demo:lag", "reference"),
    ];

    let options = MasterOptions {
        communication_step: dt,
        ..MasterOptions::default()
    };
    let mut master = Master::new(Box::new(catalog), options)?;

    let stim = master.add_component(descriptors[0].clone())?;
    let amp = master.add_component(descriptors[1].clone())?;
    let plant = master.add_component(descriptors[2].clone())?;
    let reference = master.add_component(descriptors[3].clone())?;

    let stim_y = master.port(stim, "y")?;
    let amp_u = master.port(amp, "u")?;
    let amp_y = master.port(amp, "y")?;
    let plant_u = master.port(plant, "u")?;
    let plant_x = master.port(plant, "x")?;
    let reference_u = master.port(reference, "u")?;
    let reference_x = master.port(reference, "x")?;

    master.connect(&stim_y, &amp_u)?;
    master.connect(&amp_y, &plant_u)?;

    // External stimulus with captured state: a staircase ramp.
    let mut tick = 0_u64;
    master.bind_external_driver(&reference_u, move || {
        tick += 1;
        Value::Real(tick as f64 * 0.1)
    })?;

    master.register_event(
        {
            let plant_x = plant_x.clone();
            move |m: &Master| Ok(m.get(&plant_x)?.as_real().unwrap_or(0.0) > 1.0)
        },
        |m: &mut Master| {
            println!("-- plant output crossed 1.0 at t = {:.3}", m.current_time());
            Ok(())
        },
    )?;

    master.freeze()?;

    let watched = vec![stim_y, amp_y, plant_x, reference_x];
    let mut recorder = TraceRecorder::over_ports(&master, watched.clone())?;
    run_and_print(&mut master, &mut recorder, &watched, steps, dt)?;

    println!(
        "components: {}, couplings: {}, drivers: {}",
        master.component_count(),
        master.coupling_count(),
        master.driver_count()
    );

    if let Some(dir) = trace_dir {
        save_trace(recorder, &descriptors, "demo-coupled", dt, dir)?;
    }
    timer.stop_and_print();
    Ok(())
}

fn run_demo_thermostat(
    steps: usize,
    dt: f64,
    period: f64,
    limit: f64,
    trace_dir: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let timer = Timer::start("demo-thermostat");

    let mut catalog = ModelCatalog::new();
    catalog.register("demo:relay", move |d| {
        Ok(Box::new(CyclingRelay::new(d.name.as_str(), period, 10.0)))
    });
    catalog.register("demo:lag", |d| {
        Ok(Box::new(FirstOrderLag::new(d.name.as_str(), 5.0)))
    });

    let descriptors = vec![
        ModelDescriptor::predictive("demo:relay", "heater"),
        ModelDescriptor::fixed_step("demo:lag", "plant"),
    ];

    let options = MasterOptions {
        communication_step: dt,
        ..MasterOptions::default()
    };
    let mut master = Master::new(Box::new(catalog), options)?;

    let heater = master.add_component(descriptors[0].clone())?;
    let plant = master.add_component(descriptors[1].clone())?;

    let heater_q = master.port(heater, "q")?;
    let heater_enable = master.port(heater, "enable")?;
    let plant_u = master.port(plant, "u")?;
    let plant_x = master.port(plant, "x")?;

    master.connect(&heater_q, &plant_u)?;

    // One-shot protective shutdown: once the plant level passes the limit,
    // the heater stays disabled for the rest of the run.
    master.register_event(
        {
            let plant_x = plant_x.clone();
            move |m: &Master| Ok(m.get(&plant_x)?.as_real().unwrap_or(0.0) > limit)
        },
        {
            let heater_enable = heater_enable.clone();
            move |m: &mut Master| {
                println!(
                    "-- limit reached at t = {:.3}, disabling heater",
                    m.current_time()
                );
                m.set(&heater_enable, Value::Boolean(false))
            }
        },
    )?;

    master.freeze()?;

    let watched = vec![heater_q, plant_x];
    let mut recorder = TraceRecorder::over_ports(&master, watched.clone())?;
    run_and_print(&mut master, &mut recorder, &watched, steps, dt)?;

    if let Some(dir) = trace_dir {
        save_trace(recorder, &descriptors, "demo-thermostat", dt, dir)?;
    }
    timer.stop_and_print();
    Ok(())
}
