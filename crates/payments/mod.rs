pub mod mercadopago_client;
