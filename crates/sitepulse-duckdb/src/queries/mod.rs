pub mod events;
pub mod first_visits;
