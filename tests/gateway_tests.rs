// Optional gateway tests when a Docker daemon is available

use doke::config::DockerConfig;
use doke::gateway::{ContainerFilter, DockerGateway, Gateway, GatewayError};

async fn gateway() -> Option<DockerGateway> {
    let gateway = DockerGateway::connect(&DockerConfig::default()).ok()?;
    // Connecting is lazy; call once so a missing daemon skips the test.
    gateway.system_info().await.ok()?;
    Some(gateway)
}

#[tokio::test]
async fn docker_gateway_lists_resources() {
    let Some(gateway) = gateway().await else {
        return; // Skip when Docker is not available (e.g. CI without Docker)
    };
    let containers = gateway
        .list_containers(ContainerFilter::everything())
        .await
        .expect("list containers");
    for c in &containers {
        assert!(!c.id.is_empty());
    }
    gateway.list_images().await.expect("list images");
    let networks = gateway.list_networks().await.expect("list networks");
    assert!(networks.iter().any(|n| n.name == "bridge" || n.name == "host"));
    gateway.disk_usage().await.expect("disk usage");
}

#[tokio::test]
async fn docker_gateway_unknown_container_is_not_found() {
    let Some(gateway) = gateway().await else {
        return;
    };
    let err = gateway
        .inspect_container("doke-test-no-such-container")
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::NotFound(_)), "got {:?}", err);
}
