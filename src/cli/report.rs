use crate::daemon::{DBUS_NAME, DBUS_PATH};
use anyhow::{Context, Result};

pub async fn run() -> Result<()> {
    let report = call_daemon("Report").await?;
    print!("{}", report);
    Ok(())
}

pub(crate) async fn call_daemon(method: &str) -> Result<String> {
    let connection = zbus::Connection::session()
        .await
        .context("Failed to connect to session D-Bus")?;

    let reply: String = connection
        .call_method(Some(DBUS_NAME), DBUS_PATH, Some(DBUS_NAME), method, &())
        .await
        .with_context(|| format!("Failed to call {} method - is the daemon running?", method))?
        .body()
        .deserialize()
        .context("Failed to deserialize response")?;

    Ok(reply)
}
