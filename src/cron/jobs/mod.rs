pub mod update_price_data;
