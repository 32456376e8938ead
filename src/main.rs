use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use elevatormaster::{backup, config, init, ip_help_functions, print};
use elevatormaster::master::{self, MasterState, SharedMaster};
use elevatormaster::network::{tcp_network, udp_broadcast, NetEvent};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = init::parse_args()?;

    match ip_help_functions::self_ip() {
        Ok(ip) => print::info(format!("Starter master på {}:{}", ip, cfg.port)),
        Err(e) => print::warn(format!("{:#}", e)),
    }

    /* START ----------- Init av delt tilstand og kanal frå transport ---------------------- */
    let (net_tx, net_rx) = mpsc::channel::<NetEvent<tcp_network::TcpPeer>>(config::NET_EVENT_QUEUE);
    let master_state: SharedMaster<tcp_network::TcpPeer> = Arc::new(Mutex::new(MasterState::from_config(&cfg)));
    /* SLUTT ----------- Init av delt tilstand og kanal frå transport ---------------------- */

    // Utan listener er det ingen master
    let listener = tcp_network::bind_listener(cfg.port).await?;

    /* START ----------- Starte nettverkstasks ---------------------- */
    let tcp_timeout = cfg.tcp_timeout;
    let listener_task = tokio::spawn(tcp_network::listener_task(listener, net_tx, tcp_timeout));

    {
        let beacon_addr = cfg.beacon_addr.clone();
        let period = cfg.beacon_period;
        let port = cfg.port;
        let _beacon_task = tokio::spawn(async move {
            print::info("Starter udp-broadcaster".to_string());
            if let Err(e) = udp_broadcast::start_udp_broadcaster(&beacon_addr, period, port).await {
                print::err(format!("Beacon stopped: {:#}", e));
            }
        });
    }
    /* SLUTT ----------- Starte nettverkstasks ---------------------- */

    // Venter på backup frå slavane før vi ser etter tapte heisar
    let _settle_task = tokio::spawn(backup::reconcile_after_settle(master_state.clone(), cfg.settle));

    tokio::select! {
        res = master::run_master(master_state, net_rx) => {
            res?;
        }
        res = listener_task => {
            match res {
                Ok(Err(e)) => return Err(e.context("TCP listener stopped")),
                Ok(Ok(())) => anyhow::bail!("TCP listener stopped"),
                Err(e) => anyhow::bail!("TCP listener task failed: {}", e),
            }
        }
    }
    Ok(())
}
