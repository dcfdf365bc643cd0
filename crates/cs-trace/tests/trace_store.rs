//! Integration test: record a short coupled run, store it, reload it,
//! export CSV.

use cs_backend::ModelDescriptor;
use cs_core::Value;
use cs_master::{Master, MasterOptions};
use cs_models::{GainModel, ModelCatalog};
use cs_trace::{RunStore, TraceManifest, TraceRecorder, compute_run_id};

fn sampled_run() -> (Vec<ModelDescriptor>, TraceRecorder, f64) {
    let mut catalog = ModelCatalog::new();
    catalog.register("demo:gain-2x", |d| Ok(Box::new(GainModel::new(d.name.as_str(), 2.0))));

    let descriptors = vec![ModelDescriptor::fixed_step("demo:gain-2x", "p")];
    let options = MasterOptions {
        communication_step: 0.5,
        ..MasterOptions::default()
    };
    let step = options.communication_step;

    let mut master = Master::new(Box::new(catalog), options).unwrap();
    let p = master.add_component(descriptors[0].clone()).unwrap();
    let p_u = master.port(p, "u").unwrap();
    let p_y = master.port(p, "y").unwrap();
    master.freeze().unwrap();

    let mut recorder = TraceRecorder::over_ports(&master, vec![p_y]).unwrap();
    recorder.sample(&master).unwrap();
    for i in 1..=2 {
        master.set(&p_u, Value::Real(i as f64)).unwrap();
        master.advance(i as f64).unwrap();
        recorder.sample(&master).unwrap();
    }

    (descriptors, recorder, step)
}

#[test]
fn save_load_and_export_a_run() {
    let temp_dir = std::env::temp_dir().join("cs_trace_test");
    let _ = std::fs::remove_dir_all(&temp_dir);

    let (descriptors, recorder, step) = sampled_run();
    assert_eq!(recorder.len(), 3);
    assert_eq!(recorder.columns()[0].label, "p.y");

    let run_id = compute_run_id(&descriptors, step, "v1");
    let (columns, records) = recorder.into_parts();
    let manifest = TraceManifest::new(run_id.clone(), "demo-coupled", step, columns);

    let store = RunStore::new(temp_dir.clone()).unwrap();
    assert!(!store.has_run(&run_id));
    store.save_run(&manifest, &records).unwrap();
    assert!(store.has_run(&run_id));

    let loaded_manifest = store.load_manifest(&run_id).unwrap();
    assert_eq!(loaded_manifest.scenario_id, "demo-coupled");
    assert_eq!(loaded_manifest.columns.len(), 1);

    let loaded = store.load_series(&run_id).unwrap();
    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded[0].time, 0.0);
    assert_eq!(loaded[0].values[0], Value::Real(0.0));
    assert_eq!(loaded[2].time, 2.0);
    assert_eq!(loaded[2].values[0], Value::Real(4.0));

    let mut csv = Vec::new();
    store.export_csv(&run_id, &mut csv).unwrap();
    let csv = String::from_utf8(csv).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("time,p.y"));
    assert_eq!(lines.next(), Some("0,0"));
    assert_eq!(lines.next(), Some("1,2"));
    assert_eq!(lines.next(), Some("2,4"));
}

#[test]
fn listing_filters_by_scenario() {
    let temp_dir = std::env::temp_dir().join("cs_trace_test_list");
    let _ = std::fs::remove_dir_all(&temp_dir);

    let store = RunStore::new(temp_dir.clone()).unwrap();
    for (run_id, scenario) in [("a", "demo-coupled"), ("b", "demo-coupled"), ("c", "other")] {
        let manifest = TraceManifest::new(run_id.to_string(), scenario, 0.5, Vec::new());
        store.save_run(&manifest, &[]).unwrap();
    }

    assert_eq!(store.list_runs("demo-coupled").unwrap().len(), 2);
    assert_eq!(store.list_runs("other").unwrap().len(), 1);
    assert!(store.list_runs("absent").unwrap().is_empty());

    assert!(matches!(
        store.load_manifest("zzz"),
        Err(cs_trace::TraceError::RunNotFound { .. })
    ));
}
