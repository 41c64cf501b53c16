mod panel_startup;
mod scenarios;
