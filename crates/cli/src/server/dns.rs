use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use steer_dns_domain::Transport;
use steer_dns_infrastructure::dns::transport::tcp::{
    read_with_length_prefix, send_with_length_prefix,
};
use steer_dns_infrastructure::dns::DnsServerHandler;
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const MAX_UDP_REQUEST: usize = 4096;
const TCP_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

pub struct DnsListeners {
    udp: Arc<UdpSocket>,
    tcp: TcpListener,
    addr: SocketAddr,
}

/// Binds both listeners up front so a bad address or a busy port fails startup.
pub fn bind_dns(bind_addr: &str) -> anyhow::Result<DnsListeners> {
    let socket_addr: SocketAddr = bind_addr.parse()?;
    let domain = if socket_addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let udp = create_udp_socket(domain, socket_addr)?;
    let tcp = create_tcp_listener(domain, socket_addr)?;
    Ok(DnsListeners {
        udp: Arc::new(udp),
        tcp,
        addr: socket_addr,
    })
}

pub async fn serve_dns(
    listeners: DnsListeners,
    handler: DnsServerHandler,
    shutdown: CancellationToken,
) {
    info!(bind_address = %listeners.addr, "DNS server listening on UDP and TCP");

    let handler = Arc::new(handler);
    let udp = tokio::spawn(run_udp(listeners.udp, handler.clone(), shutdown.clone()));
    let tcp = tokio::spawn(run_tcp(listeners.tcp, handler, shutdown));

    let _ = tokio::join!(udp, tcp);
    info!("DNS server stopped");
}

async fn run_udp(
    socket: Arc<UdpSocket>,
    handler: Arc<DnsServerHandler>,
    shutdown: CancellationToken,
) {
    let mut recv_buf = vec![0u8; MAX_UDP_REQUEST];

    loop {
        let (len, from) = tokio::select! {
            _ = shutdown.cancelled() => break,
            received = socket.recv_from(&mut recv_buf) => match received {
                Ok(received) => received,
                Err(e) => {
                    warn!(error = %e, "UDP recv error");
                    continue;
                }
            },
        };

        let request = recv_buf[..len].to_vec();
        let handler = handler.clone();
        let socket = socket.clone();
        tokio::spawn(async move {
            let Some(response) = handler.handle(&request, Transport::Udp).await else {
                return;
            };
            if let Err(e) = socket.send_to(&response.bytes, from).await {
                debug!(client = %from, error = %e, "Failed to send UDP reply");
            }
            handler.commit(response);
        });
    }
}

async fn run_tcp(
    listener: TcpListener,
    handler: Arc<DnsServerHandler>,
    shutdown: CancellationToken,
) {
    loop {
        let (stream, peer) = tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(error = %e, "TCP accept error");
                    continue;
                }
            },
        };

        let handler = handler.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown.cancelled() => {}
                _ = serve_tcp_connection(stream, peer, &handler) => {}
            }
        });
    }
}

/// Answers framed requests on one connection until the client closes it or
/// goes idle.
async fn serve_tcp_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    handler: &DnsServerHandler,
) {
    let _ = stream.set_nodelay(true);
    loop {
        let read = tokio::time::timeout(TCP_IDLE_TIMEOUT, read_with_length_prefix(&mut stream));
        let request = match read.await {
            Ok(Ok(request)) => request,
            Ok(Err(_)) | Err(_) => break,
        };

        let Some(response) = handler.handle(&request, Transport::Tcp).await else {
            break;
        };
        let sent = send_with_length_prefix(&mut stream, &response.bytes).await;
        handler.commit(response);
        if let Err(e) = sent {
            debug!(client = %peer, error = %e, "Failed to send TCP reply");
            break;
        }
    }
}

fn create_udp_socket(domain: Domain, socket_addr: SocketAddr) -> anyhow::Result<UdpSocket> {
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.set_recv_buffer_size(512 * 1024)?;
    socket.set_send_buffer_size(512 * 1024)?;
    socket.bind(&socket_addr.into())?;
    socket.set_nonblocking(true)?;
    let std_socket: std::net::UdpSocket = socket.into();
    Ok(UdpSocket::from_std(std_socket)?)
}

fn create_tcp_listener(domain: Domain, socket_addr: SocketAddr) -> anyhow::Result<TcpListener> {
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;
    socket.set_nonblocking(true)?;
    let std_listener: std::net::TcpListener = socket.into();
    Ok(TcpListener::from_std(std_listener)?)
}
