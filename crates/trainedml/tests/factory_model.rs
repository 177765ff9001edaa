use ndarray::Array2;
use trainedml::config::{ForestParams, ModelConfig, Task};
use trainedml::models::factory;
use trainedml::models::Target;

#[test]
fn test_factory_builds_and_predicts() {
    // tiny dataset
    let x = Array2::from_shape_vec(
        (6, 2),
        vec![
            1.0, 0.0, // pos
            0.0, 1.0, // neg
            1.0, 0.1, // pos
            0.0, 0.9, // neg
            1.1, 0.0, // pos
            0.0, 1.2, // neg
        ],
    )
    .expect("failed to create feature matrix");
    let y: Vec<String> = ["pos", "neg", "pos", "neg", "pos", "neg"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let config = ModelConfig::RandomForest(ForestParams {
        n_estimators: 5,
        max_depth: Some(3),
        ..ForestParams::default()
    });
    let mut model = factory::build_model(config).unwrap();
    assert_eq!(model.task(), Task::Classification);
    model.fit(&x, &Target::Labels(y)).unwrap();
    let predictions = model.predict(&x).unwrap();
    assert_eq!(predictions.len(), x.nrows());
    match predictions {
        Target::Labels(labels) => assert!(labels.iter().all(|l| l == "pos" || l == "neg")),
        other => panic!("classifier returned {:?}", other),
    }
}

#[test]
fn test_every_regressor_fits_a_plane() {
    let x = Array2::from_shape_fn((30, 2), |(i, j)| ((i * 7 + j * 3) % 11) as f64 + 0.5 * j as f64);
    let y: Vec<f64> = x.rows().into_iter().map(|r| 1.5 * r[0] - r[1] + 0.25).collect();

    for (name, mut model) in factory::models_for_task(Task::Regression).unwrap() {
        model.fit(&x, &Target::Values(y.clone())).unwrap();
        let r2 = model.evaluate(&x, &Target::Values(y.clone())).unwrap();
        assert!(r2.is_finite(), "{} produced r2 = {}", name, r2);
        assert_eq!(model.predict(&x).unwrap().len(), 30);
    }
}

#[test]
fn test_model_config_json_round_trip() {
    let json = r#"{"model": "knn", "params": {"n_neighbors": 3}}"#;
    let config: ModelConfig = serde_json::from_str(json).unwrap();
    match &config {
        ModelConfig::Knn(params) => assert_eq!(params.n_neighbors, 3),
        other => panic!("expected knn, got {:?}", other),
    }
    let back: ModelConfig = serde_json::from_str(&serde_json::to_string(&config).unwrap()).unwrap();
    assert_eq!(config, back);
}
