pub mod battery;
pub mod photovoltaic_plate;
pub mod point_of_consumption;
pub mod point_of_grid_delivery;

pub use self::{
    battery::Battery,
    photovoltaic_plate::PhotovoltaicPlate,
    point_of_consumption::PointOfConsumption,
    point_of_grid_delivery::PointOfGridDelivery,
};
