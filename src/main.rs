mod logging;
mod models;
mod scenario;
mod simulation;
mod world;

use clap::{Arg, Command};
use logging::{init_logging, parse_log_level, LogConfig, LogOutput};
use models::{Entity, IMovement, Obstacle, ObstacleType, Point3, Robot};
use scenario::ScenarioConfig;
use simulation::SimulationEngine;
use world::World;

fn main() {
    // コマンドライン引数の解析
    let matches = Command::new("robosim")
        .version("0.1.0")
        .about("ロボット環境シミュレーション (Robot Environment Simulation)")
        .long_about(
            "3次元占有グリッド上の異種ロボットシミュレーション\n\
             障害物のある有界ワールドで地上・飛行ロボットの移動検証を行います。",
        )
        .arg(
            Arg::new("scenario")
                .short('s')
                .long("scenario")
                .value_name("FILE")
                .help("シナリオファイル(.yaml)のパスを指定")
                .long_help(
                    "実行するシナリオファイル(.yaml)のパスを指定します。\n\
                     指定しない場合、利用方法とシナリオ一覧を表示します。",
                ),
        )
        .arg(
            Arg::new("info")
                .short('i')
                .long("info")
                .action(clap::ArgAction::SetTrue)
                .help("シナリオの情報のみ表示して終了")
                .conflicts_with("test"),
        )
        .arg(
            Arg::new("test")
                .short('t')
                .long("test")
                .action(clap::ArgAction::SetTrue)
                .help("エンティティモデルのテストを実行")
                .conflicts_with("info"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(clap::ArgAction::Count)
                .help("詳細出力レベル (-v: 基本, -vv: 詳細)"),
        )
        .arg(
            Arg::new("log-output")
                .long("log-output")
                .value_name("DEST")
                .help("ログ出力先 (console, file, both)"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("ログレベル (trace, debug, info, warn, error)"),
        )
        .get_matches();

    // ログ初期化
    let output = matches
        .get_one::<String>("log-output")
        .map(String::as_str)
        .unwrap_or("console")
        .parse::<LogOutput>()
        .unwrap_or_else(|e| {
            eprintln!("警告: {}", e);
            LogOutput::Console
        });
    let level = parse_log_level(
        matches
            .get_one::<String>("log-level")
            .map(String::as_str)
            .unwrap_or("info"),
    );
    let log_config = LogConfig {
        level,
        output,
        ..LogConfig::default()
    };
    if let Err(e) = init_logging(log_config) {
        eprintln!("警告: ログ初期化に失敗しました: {}", e);
    }

    println!("ロボット環境シミュレーション (Robot Environment Simulation) - robosim v0.1.0");
    println!();

    let verbose_level = matches.get_count("verbose");

    // テストモードの実行
    if matches.get_flag("test") {
        println!("=== エンティティモデルテストモード ===");
        test_entity_models();
        return;
    }

    // シナリオファイルの処理
    if let Some(scenario_path) = matches.get_one::<String>("scenario") {
        match run_scenario(scenario_path, matches.get_flag("info"), verbose_level) {
            Ok(_) => {
                if verbose_level > 0 {
                    println!("シナリオ実行が正常に完了しました。");
                }
            }
            Err(e) => {
                eprintln!("エラー: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        // デフォルト動作: 利用方法とシナリオ一覧を表示
        show_default_help();
    }
}

/// エンティティモデルの動作確認
///
/// ワールド・ロボット・障害物を直接構築し、配置と移動検証の代表的な
/// 成功／失敗ケースを実行して表示します。
fn test_entity_models() {
    println!("\n=== エンティティモデルのテスト ===");

    // ワールドの作成
    let mut world = match World::new(20, 20, 60) {
        Ok(world) => world,
        Err(e) => {
            eprintln!("ワールド作成に失敗しました: {}", e);
            return;
        }
    };
    println!("ワールドが作成されました: 20 x 20 x 60 セル");

    // 障害物の作成（建物: 底面矩形 + デフォルト高さ）
    let building = Obstacle::from_base(
        "OBS001".to_string(),
        ObstacleType::Building,
        5,
        5,
        6,
        6,
        0,
        Some(3),
    );
    match world.add_entity(Entity::Obstacle(building)) {
        Ok(()) => println!("障害物が配置されました: OBS001 (建物)"),
        Err(e) => println!("障害物の配置に失敗: {}", e),
    }

    // 地上ロボットの作成
    let mut ground = Robot::ground(
        "R001".to_string(),
        'R',
        "運搬用地上ロボット".to_string(),
        Point3::new(0, 0, 0),
        3.0,
    );
    ground.power_on();
    ground.attach_sensor("測距センサー".to_string());
    ground.set_direction(models::Direction::East);
    println!(
        "地上ロボットの向き: {} / 搭載センサー: {}基",
        ground.direction.label(),
        ground.sensors.len()
    );
    let ground_movement = ground.movement;
    match world.add_entity(Entity::Robot(ground)) {
        Ok(()) => println!("地上ロボットが配置されました: R001 (最大速度: 3.0セル)"),
        Err(e) => println!("地上ロボットの配置に失敗: {}", e),
    }

    // 飛行ロボットの作成
    let mut aerial = Robot::aerial(
        "A001".to_string(),
        'A',
        "偵察用飛行ロボット".to_string(),
        Point3::new(10, 10, 48),
        0,
        50,
    );
    aerial.power_on();
    let aerial_movement = aerial.movement;
    match world.add_entity(Entity::Robot(aerial)) {
        Ok(()) => println!("飛行ロボットが配置されました: A001 (高度上限: 50セル)"),
        Err(e) => println!("飛行ロボットの配置に失敗: {}", e),
    }

    println!("\n--- 移動検証 ---");

    // 速度内の平面移動: sqrt(8) ≈ 2.83 <= 3.0
    report_move(
        "R001 を (+2, +2, 0) 移動",
        ground_movement.validate(&mut world, "R001", 2, 2, 0),
    );

    // 速度超過の平面移動: sqrt(18) ≈ 4.24 > 3.0
    report_move(
        "R001 を (+3, +3, 0) 移動",
        ground_movement.validate(&mut world, "R001", 3, 3, 0),
    );

    // 地上ロボットの垂直移動
    report_move(
        "R001 を (0, 0, +1) 移動",
        ground_movement.validate(&mut world, "R001", 0, 0, 1),
    );

    // 高度上限超過: 48 + 5 = 53 > 50
    report_move(
        "A001 を (0, 0, +5) 移動",
        aerial_movement.validate(&mut world, "A001", 0, 0, 5),
    );

    // 高度上限ちょうど: 48 + 2 = 50
    report_move(
        "A001 を (0, 0, +2) 移動",
        aerial_movement.validate(&mut world, "A001", 0, 0, 2),
    );

    if let Ok(robot) = world.robot("R001") {
        println!("\nR001 の現在位置: {}", robot.position);
    }
    if let Ok(robot) = world.robot("A001") {
        println!("A001 の現在位置: {}", robot.position);
    }

    println!("\n--- Z=0 層の描画 ---");
    if let Ok(layer) = world.render_layer(0) {
        print!("{}", layer);
    }

    println!("\n全てのエンティティモデルが正常に動作しました！");
}

fn report_move(label: &str, result: Result<(), world::WorldError>) {
    match result {
        Ok(()) => println!("  {} -> 成功", label),
        Err(e) => println!("  {} -> 拒否 ({})", label, e),
    }
}

/// シナリオファイルを読み込んで実行
fn run_scenario(
    scenario_path: &str,
    info_only: bool,
    verbose_level: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    // シナリオファイルの読み込み
    let scenario = ScenarioConfig::from_file(scenario_path)?;

    if verbose_level > 0 {
        println!("シナリオファイル読み込み完了: {}", scenario_path);
    }

    // 情報表示のみの場合
    if info_only {
        scenario.print_summary();
        return Ok(());
    }

    // シナリオ実行
    scenario.print_summary();
    println!();

    let mut engine = SimulationEngine::new(scenario, verbose_level)?;
    engine.initialize()?;
    engine.run()?;

    // 最終状態の表示
    if verbose_level > 0 {
        println!("\n=== 最終状態 (Z=0) ===");
        if let Ok(layer) = engine.world.render_layer(0) {
            print!("{}", layer);
        }
    }

    Ok(())
}

/// デフォルトヘルプとシナリオ一覧を表示
fn show_default_help() {
    println!("使用方法:");
    println!("  robosim [オプション]");
    println!();
    println!("オプション:");
    println!("  -s, --scenario <FILE>  シナリオファイルを指定して実行");
    println!("  -i, --info             シナリオ情報のみ表示");
    println!("  -t, --test             エンティティモデルのテスト実行");
    println!("  -v, --verbose          詳細出力 (複数指定で詳細レベル上昇)");
    println!("      --log-output <DEST> ログ出力先 (console, file, both)");
    println!("      --log-level <LEVEL> ログレベル (trace〜error)");
    println!("  -h, --help             このヘルプを表示");
    println!();
    println!("利用可能なシナリオファイル:");
    println!("  scenarios/scenario_simple_test.yaml    - 基本テスト用");
    println!("  scenarios/scenario_obstacle_field.yaml - 障害物混在シナリオ");
    println!();
    println!("例:");
    println!("  robosim -s scenarios/scenario_simple_test.yaml");
    println!("  robosim -s scenarios/scenario_obstacle_field.yaml -v");
    println!("  robosim -s scenarios/scenario_obstacle_field.yaml -i");
    println!("  robosim --test");
}
