use vs_results::*;

fn unique_dir(tag: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("vs_results_{tag}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn manifest(run_id: &str, timestamp: &str) -> RunManifest {
    RunManifest {
        run_id: run_id.to_string(),
        config_name: "test".to_string(),
        timestamp: timestamp.to_string(),
        solver_version: "v1".to_string(),
        n: 2,
        endpt: 1.0,
        nu: 0.001,
        tol: 1e-6,
        time_length: 2,
        stats: IntegrationStats {
            accepted_steps: 4,
            rejected_steps: 1,
            rhs_evals: 32,
        },
    }
}

fn mesh() -> MeshRecord {
    MeshRecord {
        n: 2,
        endpt: 1.0,
        x_mesh: vec![vec![-1.0, 0.0], vec![-1.0, 0.0]],
        y_mesh: vec![vec![-1.0, -1.0], vec![0.0, 0.0]],
    }
}

#[test]
fn save_and_load_run() {
    let store = RunStore::new(unique_dir("save_load")).unwrap();
    let frames = vec![
        FrameRecord {
            time: 0.0,
            omega: vec![1.0, -1.0, 0.5, 0.0],
        },
        FrameRecord {
            time: 1.0,
            omega: vec![0.9, -0.9, 0.45, 0.125],
        },
    ];

    assert!(!store.has_run("abc"));
    store
        .save_run(&manifest("abc", "2026-01-01T00:00:00Z"), &frames, &mesh())
        .unwrap();
    assert!(store.has_run("abc"));

    assert_eq!(store.load_manifest("abc").unwrap(), manifest("abc", "2026-01-01T00:00:00Z"));
    assert_eq!(store.load_frames("abc").unwrap(), frames);
    assert_eq!(store.load_frame("abc", 1).unwrap(), frames[1]);
    assert_eq!(store.load_mesh("abc").unwrap(), mesh());
    assert!(matches!(
        store.load_frame("abc", 2),
        Err(ResultsError::Corrupt { .. })
    ));
}

#[test]
fn missing_run_is_not_found() {
    let store = RunStore::new(unique_dir("missing")).unwrap();
    assert!(matches!(
        store.load_manifest("nope"),
        Err(ResultsError::RunNotFound { .. })
    ));
    assert!(matches!(
        store.load_frames("nope"),
        Err(ResultsError::RunNotFound { .. })
    ));
}

#[test]
fn list_runs_newest_first() {
    let store = RunStore::new(unique_dir("list")).unwrap();
    store
        .save_run(&manifest("old", "2025-06-01T00:00:00Z"), &[], &mesh())
        .unwrap();
    store
        .save_run(&manifest("new", "2026-06-01T00:00:00+02:00"), &[], &mesh())
        .unwrap();
    // Incomplete run directory without a manifest is skipped.
    std::fs::create_dir_all(store.root_dir().join("partial")).unwrap();

    let ids: Vec<String> = store.list_runs().unwrap().into_iter().map(|m| m.run_id).collect();
    assert_eq!(ids, vec!["new".to_string(), "old".to_string()]);

    store.delete_run("new").unwrap();
    assert!(!store.has_run("new"));
    assert_eq!(store.list_runs().unwrap().len(), 1);
}

#[test]
fn store_lives_beside_config() {
    let dir = unique_dir("beside");
    std::fs::create_dir_all(&dir).unwrap();
    let store = RunStore::for_config(&dir.join("run.yaml")).unwrap();
    assert_eq!(store.root_dir(), dir.join(".vortstream").join("runs"));
    assert!(store.root_dir().is_dir());
}
