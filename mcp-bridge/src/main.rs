//! B737 MCP Bridge
//!
//! Relays the B737 Mode Control Panel hardware to X-Plane: switches and
//! buttons become key presses, encoders become dataref writes, and the
//! query button reads the vertical speed dial back to the panel.

mod keyboard;
mod serial_io;
mod settings;

use anyhow::Context;
use mcp_protocol::PanelLayout;
use mcp_relay::{PanelRelay, UdpTransport};
use serial_io::PanelConnection;
use settings::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "b737_mcp=info,mcp_protocol=info,mcp_relay=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting B737 MCP bridge");

    let settings = Settings::load();
    tracing::debug!("Settings: {:?}", settings);

    let panel = PanelConnection::open(
        &settings.serial_port,
        settings.baud_rate,
        settings.read_timeout(),
    )
    .with_context(|| format!("failed to open panel port {}", settings.serial_port))?;

    let udp = UdpTransport::open(settings.bind_addr, settings.simulator_addr)
        .with_context(|| format!("failed to bind UDP socket on {}", settings.bind_addr))?;

    let keys = keyboard::platform_injector(settings.dry_run);

    let mut relay = PanelRelay::new(
        panel,
        keys,
        udp,
        PanelLayout::b737_mcp(),
        settings.relay_config(),
    );

    let result = relay.run();

    let (panel, _, udp) = relay.into_parts();
    panel.close();
    udp.close();

    result.context("panel connection lost")
}
