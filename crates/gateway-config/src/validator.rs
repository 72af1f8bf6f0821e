use crate::{ConfigError, DockerConfig, Result, RiskLevel, ServerConfig, ServerConfigRaw};

/// Outcome of admitting one `ServerConfigRaw`: the admitted config plus any
/// warnings accumulated while admitting it (invalid risk level dropped, HIGH
/// demoted to MEDIUM for lack of a docker image, ...).
#[derive(Debug, Clone)]
pub struct Admitted {
    pub config: ServerConfig,
    pub warnings: Vec<String>,
    pub demoted: bool,
}

/// Admit a config the way the file loader and environment-override loader do:
/// a `HIGH` risk level with no usable docker image is *demoted* to `MEDIUM`
/// with a warning rather than rejected outright. Used for §4.8/§6 sources.
pub fn admit_lenient(server_id: &str, raw: ServerConfigRaw) -> Admitted {
    let mut warnings = Vec::new();
    let mut demoted = false;

    let risk_level = admit_risk_level(server_id, raw.risk_level.as_ref(), &mut warnings);
    let docker = raw.docker.and_then(|d| admit_docker(server_id, d, &mut warnings));

    let (risk_level, docker) = match (risk_level, docker) {
        (Some(RiskLevel::High), None) => {
            warnings.push(format!(
                "server '{}': riskLevel HIGH requires docker.image; demoted to MEDIUM",
                server_id
            ));
            demoted = true;
            (Some(RiskLevel::Medium), None)
        }
        other => other,
    };

    Admitted {
        config: ServerConfig {
            command: raw.command,
            args: raw.args,
            env: raw.env,
            risk_level,
            docker,
        },
        warnings,
        demoted,
    }
}

/// Admit a config the way a live `POST /servers` call does: a `HIGH` risk
/// level with no usable docker image fails admission outright (§3).
pub fn admit_strict(server_id: &str, raw: ServerConfigRaw) -> Result<ServerConfig> {
    let mut warnings = Vec::new();
    let risk_level = admit_risk_level(server_id, raw.risk_level.as_ref(), &mut warnings);
    let docker = raw.docker.and_then(|d| admit_docker(server_id, d, &mut warnings));

    if risk_level == Some(RiskLevel::High) && docker.is_none() {
        return Err(ConfigError::Invalid(
            server_id.to_string(),
            "riskLevel HIGH requires docker.image to be present".to_string(),
        ));
    }

    Ok(ServerConfig {
        command: raw.command,
        args: raw.args,
        env: raw.env,
        risk_level,
        docker,
    })
}

fn admit_risk_level(
    server_id: &str,
    raw: Option<&serde_json::Value>,
    warnings: &mut Vec<String>,
) -> Option<RiskLevel> {
    let raw = raw?;
    match raw.as_u64().and_then(RiskLevel::from_u64) {
        Some(level) => Some(level),
        None => {
            warnings.push(format!(
                "server '{}': riskLevel {} is not a member of {{1,2,3}}; dropped",
                server_id, raw
            ));
            None
        }
    }
}

fn admit_docker(
    server_id: &str,
    raw: crate::DockerConfigRaw,
    warnings: &mut Vec<String>,
) -> Option<DockerConfig> {
    match raw.image {
        Some(image) => Some(DockerConfig {
            image,
            volumes: raw.volumes,
            network: raw.network,
        }),
        None => {
            warnings.push(format!(
                "server '{}': docker block present but docker.image is missing",
                server_id
            ));
            None
        }
    }
}
