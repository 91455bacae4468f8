pub mod ledger_query_api;
pub mod order_flow_api;
pub mod order_objects;
pub mod payout_api;
pub mod refund_api;
