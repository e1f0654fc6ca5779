//! Static routes. There is no routing context, so sequences contain only
//! route lines.

use super::{CommandSequence, negate};
use crate::spec::StaticRoute;

pub fn configure(routes: &[StaticRoute]) -> CommandSequence {
    routes.iter().map(route_line).collect()
}

pub fn remove(routes: &[StaticRoute]) -> CommandSequence {
    routes.iter().map(|r| negate(&route_line(r))).collect()
}

fn route_line(route: &StaticRoute) -> String {
    format!(
        "ip route {} {} {}",
        route.destination,
        route.prefix.subnet_mask(),
        route.next_hop
    )
}
