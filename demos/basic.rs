use std::time::Duration;

metacfg::bindable! {
    #[derive(Debug, Default)]
    struct Common {
        name: String = "name",
        environment: String = "environment,options=dev|staging|prod,default=dev",
    }
}

metacfg::bindable! {
    #[derive(Debug, Default)]
    struct Database {
        host: String = "host,default=${DB_HOST:localhost}",
        port: u16 = "port,range=[1:65535],default=5432",
        pool_timeout: Duration = "pool_timeout,default=30s",
        replicas: Vec<String> = "replicas,optional",
    }
}

metacfg::bindable! {
    #[derive(Debug, Default)]
    struct AppConfig {
        common: Common = flatten,
        database: Database = "database",
        motd: Option<String> = "motd,optional",
    }
}

const DOCUMENT: &str = "\
Name: demo
Database:
  Port: 6000
  Replicas: [r1, r2]
";

fn main() -> Result<(), metacfg::Error> {
    let config: AppConfig = metacfg::Config::builder()
        .from_yaml(DOCUMENT)?
        .parse()?;

    println!("App: {} ({})", config.common.name, config.common.environment);
    println!(
        "Database: {}:{} (pool timeout {:?})",
        config.database.host, config.database.port, config.database.pool_timeout
    );
    println!("Replicas: {:?}", config.database.replicas);
    if let Some(motd) = &config.motd {
        println!("{motd}");
    }

    Ok(())
}
