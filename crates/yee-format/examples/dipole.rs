//! Drive a short dipole in an air box and report energy and timings.
//!
//! Usage: `cargo run -p yee-format --example dipole [run.json]`
//! Without an argument a built-in 32³ description is used.

use yee_em::{OrAbort, RunProfile};
use yee_format::RunSpec;

const BUILTIN: &str = r#"{
    "name": "dipole-in-air",
    "grid": { "extent": [32, 32, 32], "spacing": [0.001, 0.001, 0.001] },
    "sources": [{
        "center": [0.016, 0.016, 0.016],
        "lengths": [0.0, 0.0, 0.006],
        "air_gap": 0.002,
        "frequency": 10e9
    }],
    "stop_time": 2e-10,
    "verbosity": "summary"
}"#;

fn main() {
    let spec = match std::env::args().nth(1) {
        Some(path) => RunSpec::load(&path).or_abort("RunSpec::load"),
        None => RunSpec::from_json_str(BUILTIN).or_abort("RunSpec::from_json_str"),
    };
    println!("Run: {} ({} source regions)", spec.name, spec.sources.len());

    let mut profile = RunProfile::new();
    let inputs = spec.build(&mut profile).or_abort("RunSpec::build");
    let outcome = inputs.run(&mut profile).or_abort("RunInputs::run");

    println!(
        "{} iterations, dt = {:.3e} s, t = {:.3e} s",
        outcome.summary.iterations, outcome.summary.dt, outcome.summary.final_time
    );
    println!("Energy = {:.6e} J", outcome.grid.total_energy());
    let middle: [usize; 3] =
        std::array::from_fn(|a| spec.grid.origin[a] + spec.grid.extent[a] / 2);
    if let Some([i, j, k]) = outcome.grid.global_to_node(middle) {
        let e = outcome.grid.e_field_at(i, j, k);
        println!("E at node {middle:?} = ({:.4e}, {:.4e}, {:.4e}) V/m", e.x, e.y, e.z);
    }
    outcome.grid.release(&mut profile);
    print!("{}", profile.report());
}
