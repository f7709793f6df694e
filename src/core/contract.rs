use chrono::{DateTime, Utc};
use log::info;

use crate::backend::WorldState;
use crate::core::car::{Car, CarStatus, Price, QueryResult};
use crate::core::error::{ContractError, ContractResult};
use crate::core::identity::{Identity, Role};
use crate::core::transaction::CarTransaction;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Everything a contract operation may touch: the world state, the
/// identity it runs for and the timestamp of the transaction.
pub struct TransactionContext<'a> {
    stub: &'a mut dyn WorldState,
    identity: &'a Identity,
    timestamp: DateTime<Utc>
}

impl<'a> TransactionContext<'a> {
    pub fn new(stub: &'a mut dyn WorldState, identity: &'a Identity, timestamp: DateTime<Utc>) -> Self {
        TransactionContext { stub, identity, timestamp }
    }

    pub fn identity(&self) -> &Identity {
        self.identity
    }

    pub fn stub(&mut self) -> &mut dyn WorldState {
        &mut *self.stub
    }

    fn date_stamp(&self) -> String {
        self.timestamp.format(DATE_FORMAT).to_string()
    }

    fn require_role(&self, required: Role) -> ContractResult<()> {
        if !self.identity.has_role(required) {
            return Err(ContractError::Unauthorized { required, actual: self.identity.role });
        }
        return Ok(());
    }
}

fn sample_car(manufacturer_id: &str, car_id: &str, dealer_id: &str, consumer_id: &str,
              car_model: &str, car_color: &str, prices: (Price, Price, Price)) -> Car {
    Car {
        manufacturer_id: manufacturer_id.to_owned(),
        car_id: car_id.to_owned(),
        dealer_id: dealer_id.to_owned(),
        consumer_id: consumer_id.to_owned(),
        car_make: "2022".to_owned(),
        car_model: car_model.to_owned(),
        car_color: car_color.to_owned(),
        status: CarStatus::Sold,
        manufacturing_date: "2022/01/01".to_owned(),
        shipping_date: "2022/02/01".to_owned(),
        delivery_date: "2022/02/20".to_owned(),
        sold_on_date: "2022/04/20".to_owned(),
        manufacturer_price: prices.0,
        shipping_price: prices.1,
        customer_price: prices.2
    }
}

/// Cars seeded by `InitLedger`, stored under `CAR0`..`CAR3`.
pub fn sample_cars() -> Vec<Car> {
    vec![
        sample_car("MOrg01", "M101", "D101", "CUST101", "MOrg01CM101", "Red", (350000, 10000, 550000)),
        sample_car("MOrg01", "M102", "D102", "CUST102", "MOrg01CM102", "Blue", (360000, 10000, 600000)),
        sample_car("MOrg02", "M103", "D102", "CUST103", "MOrg02CM103", "Blue", (360000, 10000, 630000)),
        sample_car("MOrg02", "M104", "D101", "CUST101", "MOrg01CM101", "Red", (350000, 10000, 550000)),
    ]
}

/// Contract managing cars from the manufacturer to their owner.
#[derive(Clone, Copy, Debug, Default)]
pub struct CarContract;

impl CarContract {
    pub const NAME: &'static str = "cardemo";

    /// Runs a decoded transaction. Queries return JSON, mutations
    /// return an empty payload.
    pub fn invoke(&self, ctx: &mut TransactionContext, tx: CarTransaction) -> ContractResult<Vec<u8>> {
        match tx {
            CarTransaction::InitLedger => self.init_ledger(ctx).map(|_| vec![]),
            CarTransaction::CreateNewCar(car) => self.create_new_car(ctx, car).map(|_| vec![]),
            CarTransaction::QueryCar { car_id } => self.query_car(ctx, &car_id)?.to_bytes(),
            CarTransaction::QueryAllCars => Ok(serde_json::to_vec(&self.query_all_cars(ctx)?)?),
            CarTransaction::ShipToDealer { car_id, dealer_id, shipping_price } =>
                self.ship_to_dealer(ctx, &car_id, &dealer_id, shipping_price).map(|_| vec![]),
            CarTransaction::ReceiveDelivery { car_id } =>
                self.receive_delivery(ctx, &car_id).map(|_| vec![]),
            CarTransaction::SellToCustomer { car_id, consumer_id, customer_price } =>
                self.sell_to_customer(ctx, &car_id, &consumer_id, customer_price).map(|_| vec![])
        }
    }

    /// Seeds the sample cars. Fails without writing anything if any seed
    /// key is already taken.
    pub fn init_ledger(&self, ctx: &mut TransactionContext) -> ContractResult<()> {
        let seeds: Vec<(String, Car)> = sample_cars().into_iter().enumerate()
            .map(|(i, car)| (format!("CAR{}", i), car))
            .collect();
        for (key, _) in &seeds {
            if ctx.stub().get_state(key)?.is_some() {
                return Err(ContractError::AlreadyExists(key.clone()));
            }
        }
        for (key, car) in &seeds {
            ctx.stub().put_state(key, car.to_bytes()?)?;
        }
        info!("seeded world state with sample cars");
        return Ok(());
    }

    pub fn create_new_car(&self, ctx: &mut TransactionContext, car: Car) -> ContractResult<()> {
        ctx.require_role(Role::Manufacturer)?;
        if ctx.stub().get_state(&car.car_id)?.is_some() {
            return Err(ContractError::AlreadyExists(car.car_id));
        }
        let car = Car { status: CarStatus::Created, ..car };
        ctx.stub().put_state(&car.car_id, car.to_bytes()?)?;
        info!("car {} created by {}", car.car_id, ctx.identity().id);
        return Ok(());
    }

    pub fn query_car(&self, ctx: &mut TransactionContext, car_id: &str) -> ContractResult<Car> {
        match ctx.stub().get_state(car_id)? {
            Some(bytes) => Car::from_bytes(&bytes),
            None => Err(ContractError::NotFound(car_id.to_owned()))
        }
    }

    pub fn query_all_cars(&self, ctx: &mut TransactionContext) -> ContractResult<Vec<QueryResult>> {
        ctx.stub().get_state_by_range("", "")?
            .into_iter()
            .map(|(key, bytes)| -> ContractResult<QueryResult> {
                Ok(QueryResult { key, record: Car::from_bytes(&bytes)? })
            })
            .collect()
    }

    pub fn ship_to_dealer(&self, ctx: &mut TransactionContext, car_id: &str, dealer_id: &str, shipping_price: Price) -> ContractResult<()> {
        ctx.require_role(Role::Manufacturer)?;
        let mut car = self.query_car(ctx, car_id)?;
        car.advance_to(CarStatus::Shipped)?;
        car.dealer_id = dealer_id.to_owned();
        car.shipping_date = ctx.date_stamp();
        car.shipping_price = shipping_price;
        self.put_car(ctx, car_id, &car)
    }

    pub fn receive_delivery(&self, ctx: &mut TransactionContext, car_id: &str) -> ContractResult<()> {
        ctx.require_role(Role::Dealer)?;
        let mut car = self.query_car(ctx, car_id)?;
        car.advance_to(CarStatus::ReadyForSale)?;
        car.delivery_date = ctx.date_stamp();
        self.put_car(ctx, car_id, &car)
    }

    pub fn sell_to_customer(&self, ctx: &mut TransactionContext, car_id: &str, consumer_id: &str, customer_price: Price) -> ContractResult<()> {
        ctx.require_role(Role::Dealer)?;
        let mut car = self.query_car(ctx, car_id)?;
        car.advance_to(CarStatus::Sold)?;
        car.consumer_id = consumer_id.to_owned();
        car.sold_on_date = ctx.date_stamp();
        car.customer_price = customer_price;
        self.put_car(ctx, car_id, &car)
    }

    fn put_car(&self, ctx: &mut TransactionContext, key: &str, car: &Car) -> ContractResult<()> {
        ctx.stub().put_state(key, car.to_bytes()?)?;
        info!("car {} is now {}", key, car.status);
        return Ok(());
    }
}
