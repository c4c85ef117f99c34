use auth::RouteTable;

/// Routes reachable without a bearer token. Everything else is protected.
pub fn public_routes() -> RouteTable {
    RouteTable::new()
        .permit("/api/auth/login")
        .permit("/api/auth/register")
        .permit("/api/rentals/image/**")
        .permit("/swagger-ui/**")
        .permit("/v3/api-docs/**")
        .permit("/swagger-ui.html")
}
