use crate::manager::StockManager;
use crate::metrics::{register_custom_metrics, REGISTRY};
use crate::store::{PgArticleDirectory, PgLotStore};
use std::convert::Infallible;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::Arc;
use uuid::Uuid;
use warp::Filter;

type Manager = Arc<StockManager<PgLotStore, PgArticleDirectory>>;

fn with_manager(manager: Manager) -> impl Filter<Extract = (Manager,), Error = Infallible> + Clone {
    warp::any().map(move || manager.clone())
}

#[tracing::instrument(skip(manager))]
async fn get_summary(article_id: Uuid, manager: Manager) -> Result<impl warp::Reply, warp::Rejection> {
    let summary = manager
        .summarize(article_id)
        .await
        .map_err(|_| warp::reject())?;
    Ok(warp::reply::json(&summary))
}

#[tracing::instrument(skip(manager))]
async fn get_lot(lot_id: Uuid, manager: Manager) -> Result<impl warp::Reply, warp::Rejection> {
    let lot = manager.lot(lot_id).await.map_err(|_| warp::reject())?;
    Ok(warp::reply::json(&lot))
}

#[tracing::instrument(skip(manager))]
async fn get_lot_movements(
    lot_id: Uuid,
    manager: Manager,
) -> Result<impl warp::Reply, warp::Rejection> {
    let movements = manager
        .movement_history(lot_id)
        .await
        .map_err(|_| warp::reject())?;
    Ok(warp::reply::json(&movements))
}

async fn metrics_handler() -> Result<impl warp::Reply, warp::Rejection> {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        eprintln!("could not encode custom metrics: {}", e);
    };
    let mut res = match String::from_utf8(buffer.clone()) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("custom metrics could not be from_utf8'd: {}", e);
            String::default()
        }
    };
    buffer.clear();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        eprintln!("could not encode prometheus metrics: {}", e);
    };
    let res_custom = match String::from_utf8(buffer.clone()) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("prometheus metrics could not be from_utf8'd: {}", e);
            String::default()
        }
    };
    buffer.clear();

    res.push_str(&res_custom);
    Ok(res)
}

#[tracing::instrument(skip(manager))]
pub async fn run(port: u16, manager: Manager) {
    register_custom_metrics();
    let health = warp::path!("health").map(|| "");
    let summary = warp::path!("articles" / Uuid / "summary")
        .and(warp::get())
        .and(with_manager(manager.clone()))
        .and_then(get_summary);
    let lot = warp::path!("lots" / Uuid)
        .and(warp::get())
        .and(with_manager(manager.clone()))
        .and_then(get_lot);
    let lot_movements = warp::path!("lots" / Uuid / "movements")
        .and(warp::get())
        .and(with_manager(manager))
        .and_then(get_lot_movements);
    let metrics = warp::path("metrics").and_then(metrics_handler);
    let routes = health.or(summary).or(lot_movements).or(lot).or(metrics);
    let address = SocketAddrV4::new(Ipv4Addr::new(0, 0, 0, 0), port);
    warp::serve(routes).run(address).await
}
