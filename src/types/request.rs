use serde::Serialize;

/// Source/destination pair plus the address receiving the funds.
///
/// Used for both `GET /detailed_quote` and `POST /swaps`.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RouteRequest {
    pub source_network: String,
    pub source_token: String,
    pub destination_network: String,
    pub destination_token: String,
    pub destination_address: String,
}

impl RouteRequest {
    /// Query parameters of `GET /detailed_quote`.
    pub fn quote_query(&self) -> [(&'static str, Option<&str>); 6] {
        [
            ("source_network", Some(self.source_network.as_str())),
            ("source_token", Some(self.source_token.as_str())),
            ("destination_network", Some(self.destination_network.as_str())),
            ("destination_token", Some(self.destination_token.as_str())),
            ("destination_address", Some(self.destination_address.as_str())),
            ("refuel", Some("false")),
        ]
    }

    /// Body of `POST /swaps` for a deposit-address swap.
    pub fn swap_body(&self) -> CreateSwapBody<'_> {
        CreateSwapBody {
            source_network: &self.source_network,
            source_token: &self.source_token,
            destination_network: &self.destination_network,
            destination_token: &self.destination_token,
            destination_address: &self.destination_address,
            refuel: false,
            use_deposit_address: true,
        }
    }
}

/// JSON body of `POST /swaps`.
#[derive(Clone, Debug, Serialize)]
pub struct CreateSwapBody<'a> {
    pub source_network: &'a str,
    pub source_token: &'a str,
    pub destination_network: &'a str,
    pub destination_token: &'a str,
    pub destination_address: &'a str,
    pub refuel: bool,
    pub use_deposit_address: bool,
}
