use std::fmt;

use serde::{Serialize, Deserialize};

use crate::core::error::{ContractError, ContractResult};

pub type Price = u64;

/// Lifecycle stage of a car. Ordered along the only allowed path
/// `Created -> Shipped -> ReadyForSale -> Sold`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CarStatus {
    #[default]
    Created,
    Shipped,
    ReadyForSale,
    Sold
}

impl CarStatus {
    pub fn next(&self) -> Option<CarStatus> {
        match self {
            Self::Created => Some(Self::Shipped),
            Self::Shipped => Some(Self::ReadyForSale),
            Self::ReadyForSale => Some(Self::Sold),
            Self::Sold => None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Shipped => "SHIPPED",
            Self::ReadyForSale => "READY_FOR_SALE",
            Self::Sold => "SOLD"
        }
    }
}

impl fmt::Display for CarStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The record held in world state for every car.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Car {
    pub manufacturer_id: String,
    pub car_id: String,
    pub dealer_id: String,
    pub consumer_id: String,
    pub car_make: String,
    pub car_model: String,
    pub car_color: String,
    pub status: CarStatus,
    pub manufacturing_date: String,
    pub shipping_date: String,
    pub delivery_date: String,
    pub sold_on_date: String,
    pub manufacturer_price: Price,
    pub shipping_price: Price,
    pub customer_price: Price
}

impl Car {
    pub fn new(manufacturer_id: &str, car_id: &str, car_make: &str, car_model: &str,
               car_color: &str, manufacturing_date: &str, manufacturer_price: Price) -> Car {
        Car {
            manufacturer_id: manufacturer_id.to_owned(),
            car_id: car_id.to_owned(),
            car_make: car_make.to_owned(),
            car_model: car_model.to_owned(),
            car_color: car_color.to_owned(),
            status: CarStatus::Created,
            manufacturing_date: manufacturing_date.to_owned(),
            manufacturer_price,
            ..Default::default()
        }
    }

    /// Moves the car one step along its lifecycle. Anything other than
    /// the immediate successor of the current status is rejected and
    /// leaves the car untouched.
    pub fn advance_to(&mut self, target: CarStatus) -> ContractResult<()> {
        if self.status.next() != Some(target) {
            return Err(ContractError::InvalidTransition {
                car_id: self.car_id.clone(),
                from: self.status,
                to: target
            });
        }
        self.status = target;
        return Ok(());
    }

    pub fn to_bytes(&self) -> ContractResult<Vec<u8>> {
        return Ok(serde_json::to_vec(self)?);
    }

    pub fn from_bytes(bytes: &[u8]) -> ContractResult<Car> {
        return Ok(serde_json::from_slice(bytes)?);
    }
}

impl fmt::Display for Car {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} ({}) [{}]",
            self.car_id, self.car_make, self.car_model, self.car_color, self.status)
    }
}

/// One entry of a full range scan over world state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Record")]
    pub record: Car
}


#[cfg(test)]
mod tests {
    use crate::core::{Car, CarStatus, ContractError};

    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn car() -> Car {
        Car::new("MOrg03", "M105", "2022", "MOrg03CM101", "White", "2022/05/01", 450000)
    }

    #[rstest]
    fn new_car_is_created(car: Car) {
        assert_eq!(car.status, CarStatus::Created);
        assert_eq!(car.dealer_id, "");
        assert_eq!(car.consumer_id, "");
        assert_eq!(car.shipping_price, 0);
    }

    #[rstest]
    fn serializes_camel_case(car: Car) {
        let value = serde_json::to_value(&car).unwrap();
        assert_eq!(value, json!({
            "manufacturerId": "MOrg03",
            "carId": "M105",
            "dealerId": "",
            "consumerId": "",
            "carMake": "2022",
            "carModel": "MOrg03CM101",
            "carColor": "White",
            "status": "CREATED",
            "manufacturingDate": "2022/05/01",
            "shippingDate": "",
            "deliveryDate": "",
            "soldOnDate": "",
            "manufacturerPrice": 450000,
            "shippingPrice": 0,
            "customerPrice": 0
        }));
    }

    #[test]
    fn partial_body_deserializes() {
        let car: Car = serde_json::from_value(json!({"carId": "M105", "dealerId": "D101"})).unwrap();
        assert_eq!(car.car_id, "M105");
        assert_eq!(car.dealer_id, "D101");
        assert_eq!(car.status, CarStatus::Created);
    }

    #[test]
    fn status_wire_names() {
        assert_eq!(serde_json::to_value(CarStatus::ReadyForSale).unwrap(), json!("READY_FOR_SALE"));
        assert_eq!(CarStatus::ReadyForSale.to_string(), "READY_FOR_SALE");
        let parsed: CarStatus = serde_json::from_value(json!("SOLD")).unwrap();
        assert_eq!(parsed, CarStatus::Sold);
    }

    #[rstest]
    fn advances_forward_only(mut car: Car) {
        car.advance_to(CarStatus::Shipped).unwrap();
        car.advance_to(CarStatus::ReadyForSale).unwrap();
        car.advance_to(CarStatus::Sold).unwrap();
        assert_eq!(car.status, CarStatus::Sold);
        assert_eq!(car.status.next(), None);
    }

    #[rstest]
    #[case(CarStatus::Created)]
    #[case(CarStatus::ReadyForSale)]
    #[case(CarStatus::Sold)]
    fn rejects_skips_and_reversals(mut car: Car, #[case] target: CarStatus) {
        let res = car.advance_to(target);
        assert!(matches!(res, Err(ContractError::InvalidTransition { from: CarStatus::Created, .. })));
        assert_eq!(car.status, CarStatus::Created);
    }

    #[test]
    fn status_order_follows_lifecycle() {
        assert!(CarStatus::Created < CarStatus::Shipped);
        assert!(CarStatus::Shipped < CarStatus::ReadyForSale);
        assert!(CarStatus::ReadyForSale < CarStatus::Sold);
    }
}
