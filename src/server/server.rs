mod server_config;
mod error;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router
};
use log::info;
use tower_http::cors::CorsLayer;

use cardemo::{Car, CarTransaction, LedgerConnection, LocalGateway, Wallet};
use cardemo::backend::JsonStore;
use cardemo::gateway::{Connection, GatewayResult};
use error::ServerError;
use server_config::AppConfig;

const SERVER_CONFIG: &str = "resources/server.toml";
const IDENTITY_HEADER: &str = "x-cardemo-identity";

type Gateway = LocalGateway<JsonStore>;

#[derive(Clone)]
struct AppState {
    gateway: Arc<Gateway>,
    wallet: Arc<Wallet>,
    default_identity: String
}

impl AppState {
    /// Connects as the wallet identity named by the request header,
    /// or as the default identity when the header is absent.
    fn connect(&self, headers: &HeaderMap) -> Result<Connection<JsonStore>, ServerError> {
        let label = match headers.get(IDENTITY_HEADER) {
            Some(value) => value.to_str()
                .map_err(|_| ServerError::BadRequest(format!("{} is not valid text", IDENTITY_HEADER)))?,
            None => self.default_identity.as_str()
        };
        let identity = self.wallet.get(label)?.clone();
        Ok(self.gateway.connect(identity))
    }
}

async fn blocking<F>(call: F) -> Result<Vec<u8>, ServerError>
where
    F: FnOnce() -> GatewayResult<Vec<u8>> + Send + 'static
{
    Ok(tokio::task::spawn_blocking(call).await??)
}

fn json_payload(payload: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], payload).into_response()
}

async fn evaluate(state: &AppState, headers: &HeaderMap, tx: CarTransaction) -> Result<Response, ServerError> {
    let conn = state.connect(headers)?;
    let payload = blocking(move || conn.evaluate(&tx)).await?;
    Ok(json_payload(payload))
}

async fn submit(state: &AppState, headers: &HeaderMap, tx: CarTransaction) -> Result<Response, ServerError> {
    let conn = state.connect(headers)?;
    let payload = blocking(move || conn.submit(&tx)).await?;
    Ok((StatusCode::OK, payload).into_response())
}

async fn welcome() -> &'static str {
    "CarDemo API V1! Welcome to the Car Manufacturer to an owner LifeCycle Smart Contract!"
}

async fn get_cars(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ServerError> {
    evaluate(&state, &headers, CarTransaction::QueryAllCars).await
}

async fn get_car(State(state): State<AppState>, headers: HeaderMap, Path(id): Path<String>) -> Result<Response, ServerError> {
    evaluate(&state, &headers, CarTransaction::QueryCar { car_id: id }).await
}

async fn init_ledger(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ServerError> {
    submit(&state, &headers, CarTransaction::InitLedger).await
}

async fn create_car(State(state): State<AppState>, headers: HeaderMap,
                    body: Result<Json<Car>, JsonRejection>) -> Result<Response, ServerError> {
    let Json(car) = body?;
    submit(&state, &headers, CarTransaction::CreateNewCar(car)).await
}

async fn ship_to_dealer(State(state): State<AppState>, headers: HeaderMap,
                        body: Result<Json<Car>, JsonRejection>) -> Result<Response, ServerError> {
    let Json(car) = body?;
    let tx = CarTransaction::ShipToDealer {
        car_id: car.car_id,
        dealer_id: car.dealer_id,
        shipping_price: car.shipping_price
    };
    submit(&state, &headers, tx).await
}

async fn receive_delivery(State(state): State<AppState>, headers: HeaderMap,
                          body: Result<Json<Car>, JsonRejection>) -> Result<Response, ServerError> {
    let Json(car) = body?;
    submit(&state, &headers, CarTransaction::ReceiveDelivery { car_id: car.car_id }).await
}

async fn sell_to_customer(State(state): State<AppState>, headers: HeaderMap,
                          body: Result<Json<Car>, JsonRejection>) -> Result<Response, ServerError> {
    let Json(car) = body?;
    let tx = CarTransaction::SellToCustomer {
        car_id: car.car_id,
        consumer_id: car.consumer_id,
        customer_price: car.customer_price
    };
    submit(&state, &headers, tx).await
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/getCars", get(get_cars))
        .route("/getCar/:id", get(get_car))
        .route("/init", post(init_ledger))
        .route("/create", post(create_car))
        .route("/ship", post(ship_to_dealer))
        .route("/receive", post(receive_delivery))
        .route("/sell", post(sell_to_customer))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config_path = std::env::args().nth(1).unwrap_or_else(|| SERVER_CONFIG.to_owned());
    let config = AppConfig::read(&config_path)
        .with_context(|| format!("failed to read app configuration from {}", config_path))?;

    let store = JsonStore::open(&config.server.state_file)
        .with_context(|| "failed to open world state")?;
    let state = AppState {
        gateway: LocalGateway::new(store, &config.server.channel),
        wallet: Arc::new(config.wallet),
        default_identity: config.server.default_identity
    };

    let listener = tokio::net::TcpListener::bind(config.server.bind).await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    info!("serving {}/{} on http://{}", config.server.channel, config.server.chaincode, config.server.bind);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
