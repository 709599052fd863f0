// Live-daemon integration tests; each test skips when Docker is not
// reachable on this host.

use dockwatch::docker_repo::DockerRepo;
use dockwatch::models::ContainerState;

async fn connect_or_skip() -> Option<DockerRepo> {
    let repo = DockerRepo::connect().ok()?;
    repo.ping().await.ok()?;
    Some(repo)
}

#[tokio::test]
async fn list_containers_produces_inventory_rows() {
    let Some(repo) = connect_or_skip().await else {
        return;
    };
    let containers = repo.list_containers().await.expect("list_containers");
    for c in &containers {
        assert!(!c.id.is_empty());
        assert!(c.id.len() <= 12);
        assert!(!c.name.is_empty());
        if c.state == ContainerState::Running {
            assert!(c.uptime_secs.is_some());
        }
    }
}

#[tokio::test]
async fn engine_stats_reports_counts() {
    let Some(repo) = connect_or_skip().await else {
        return;
    };
    let stats = repo.engine_stats().await.expect("engine_stats");
    assert!(stats.containers_running >= 0);
    assert!(stats.cpu_count > 0);
    assert!(stats.total_memory_gb > 0.0);
    assert!(!stats.server_version.is_empty());
}
