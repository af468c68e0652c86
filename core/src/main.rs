use clap::Parser;
use fractriage_core::cli::{init_logging, ServerCli};
use fractriage_core::{
    router, HeuristicQualityAssessor, HttpVisionClient, ImageRsCodec, TriagePipeline,
};
use log::{error, info};
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = ServerCli::parse();
    init_logging(cli.verbose);

    let config = cli.triage_config();
    info!(
        "Thresholds: YES {:.2}, LIKELY {:.2}; quality minimum {:.2}",
        config.thresholds.yes(),
        config.thresholds.likely(),
        config.quality_min
    );

    let vision = match HttpVisionClient::new(
        cli.vision_endpoint.clone(),
        cli.vision_api_key.clone(),
        cli.vision_timeout(),
    ) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create vision client: {}", e);
            eprintln!("Error: Failed to create vision client: {}", e);
            process::exit(1);
        }
    };
    info!("Vision endpoint: {}", vision.endpoint());

    let quality = HeuristicQualityAssessor::new(ImageRsCodec).with_threshold(config.quality_min);
    let pipeline = TriagePipeline::new(config, Arc::new(quality), Arc::new(vision));
    let app = router(Arc::new(pipeline), cli.max_upload_bytes());

    let listener = match tokio::net::TcpListener::bind(cli.bind).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", cli.bind, e);
            eprintln!("Error: Failed to bind {}: {}", cli.bind, e);
            process::exit(1);
        }
    };
    info!("Listening on {}", cli.bind);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        process::exit(1);
    }
}
