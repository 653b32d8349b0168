use barscope_audio::{
    fetcher::{DummyFetcher, Fetcher},
    MappingConfig, SmootherConfig, VisualizationEngine,
};

fn main() {
    let mut fetcher = DummyFetcher::new();

    let mut engine = VisualizationEngine::new(SmootherConfig::default()).unwrap();
    engine
        .reconfigure(MappingConfig {
            sample_rate: fetcher.sample_rate(),
            ..Default::default()
        })
        .unwrap();

    let mut block = vec![0.; engine.block_size().unwrap()];
    fetcher.fetch_samples(&mut block);

    let bars = engine.process(&block, 1.).unwrap();
    println!("{:?}", bars);
}
