use std::fmt;

use crate::core::car::{Car, Price};
use crate::core::error::{ContractError, ContractResult};

/// A contract invocation decoded from its ledger-facing name and
/// positional string arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CarTransaction {
    InitLedger,
    CreateNewCar(Car),
    QueryCar { car_id: String },
    QueryAllCars,
    ShipToDealer { car_id: String, dealer_id: String, shipping_price: Price },
    ReceiveDelivery { car_id: String },
    SellToCustomer { car_id: String, consumer_id: String, customer_price: Price }
}

fn expect_args<'a>(name: &str, args: &'a [String], count: usize) -> ContractResult<&'a [String]> {
    if args.len() != count {
        return Err(ContractError::InvalidArgument(
            format!("{} takes {} arguments, got {}", name, count, args.len())));
    }
    return Ok(args);
}

fn parse_price(field: &str, value: &str) -> ContractResult<Price> {
    value.trim().parse::<Price>()
        .map_err(|_| ContractError::InvalidArgument(format!("{} must be a non-negative integer, got {:?}", field, value)))
}

fn car_id(value: &str) -> ContractResult<String> {
    if value.trim().is_empty() {
        return Err(ContractError::InvalidArgument("carId must not be empty".to_owned()));
    }
    return Ok(value.to_owned());
}

impl CarTransaction {
    pub fn parse(name: &str, args: &[String]) -> ContractResult<CarTransaction> {
        let tx = match name {
            "InitLedger" => {
                expect_args(name, args, 0)?;
                Self::InitLedger
            },
            "createNewCar" => {
                let a = expect_args(name, args, 7)?;
                let price = parse_price("manufacturerPrice", &a[6])?;
                Self::CreateNewCar(Car::new(&a[0], &car_id(&a[1])?, &a[2], &a[3], &a[4], &a[5], price))
            },
            "QueryCar" => {
                let a = expect_args(name, args, 1)?;
                Self::QueryCar { car_id: car_id(&a[0])? }
            },
            "QueryAllCars" => {
                expect_args(name, args, 0)?;
                Self::QueryAllCars
            },
            "ShipToDealer" => {
                let a = expect_args(name, args, 3)?;
                Self::ShipToDealer {
                    car_id: car_id(&a[0])?,
                    dealer_id: a[1].clone(),
                    shipping_price: parse_price("shippingPrice", &a[2])?
                }
            },
            "ReceiveDelivery" => {
                let a = expect_args(name, args, 1)?;
                Self::ReceiveDelivery { car_id: car_id(&a[0])? }
            },
            "SellToCustomer" => {
                let a = expect_args(name, args, 3)?;
                Self::SellToCustomer {
                    car_id: car_id(&a[0])?,
                    consumer_id: a[1].clone(),
                    customer_price: parse_price("customerPrice", &a[2])?
                }
            },
            _ => return Err(ContractError::UnknownTransaction(name.to_owned()))
        };
        return Ok(tx);
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::InitLedger => "InitLedger",
            Self::CreateNewCar(_) => "createNewCar",
            Self::QueryCar { .. } => "QueryCar",
            Self::QueryAllCars => "QueryAllCars",
            Self::ShipToDealer { .. } => "ShipToDealer",
            Self::ReceiveDelivery { .. } => "ReceiveDelivery",
            Self::SellToCustomer { .. } => "SellToCustomer"
        }
    }

    /// Positional arguments as sent over a ledger connection.
    pub fn args(&self) -> Vec<String> {
        match self {
            Self::InitLedger | Self::QueryAllCars => vec![],
            Self::CreateNewCar(car) => vec![
                car.manufacturer_id.clone(),
                car.car_id.clone(),
                car.car_make.clone(),
                car.car_model.clone(),
                car.car_color.clone(),
                car.manufacturing_date.clone(),
                car.manufacturer_price.to_string()
            ],
            Self::QueryCar { car_id } | Self::ReceiveDelivery { car_id } => vec![car_id.clone()],
            Self::ShipToDealer { car_id, dealer_id, shipping_price } =>
                vec![car_id.clone(), dealer_id.clone(), shipping_price.to_string()],
            Self::SellToCustomer { car_id, consumer_id, customer_price } =>
                vec![car_id.clone(), consumer_id.clone(), customer_price.to_string()]
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::QueryCar { .. } | Self::QueryAllCars)
    }
}

impl fmt::Display for CarTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.args().join(", "))
    }
}
