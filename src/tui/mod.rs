//! Terminal UI: Elm-style event loop, landing-page views, chat panel.

pub mod app;
pub mod events;
pub mod layout;
pub mod services;
pub mod theme;
pub mod views;
pub mod widgets;
