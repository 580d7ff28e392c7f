// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Building packers from TOML configuration

use fabstir_vision_tensor::config::PackerConfig;
use fabstir_vision_tensor::tensor::{OffsetStrategy, PixelBuffer, TensorError, TensorPacker};
use fabstir_vision_tensor::vision::ResizeMode;

#[test]
fn test_packer_from_toml() {
    let config = PackerConfig::from_toml_str(
        r#"
        [tensor]
        target_width = 4
        target_height = 2
        mean = [0.0, 0.0, 0.0]
        stddev = [1.0, 1.0, 1.0]
        strategy = "scalar"
        parallel = true
        resize_mode = "stretch"
        "#,
    )
    .unwrap();

    let packer = TensorPacker::new(&config).unwrap();
    assert_eq!(packer.target_shape(5), [5, 3, 2, 4]);
    assert_eq!(packer.options().strategy, OffsetStrategy::Scalar);
    assert!(packer.options().parallel);

    let images = vec![PixelBuffer::filled(4, 2, [255, 255, 255]); 2];
    let tensor = packer.pack_images(&images).unwrap();
    assert!(tensor.as_slice().iter().all(|&v| v == 1.0));
}

#[test]
fn test_packer_rejects_invalid_config() {
    let config = PackerConfig {
        stddev: vec![0.2, -0.1, 0.2],
        ..PackerConfig::default()
    };
    assert!(matches!(
        TensorPacker::new(&config),
        Err(TensorError::InvalidStddev { channel: 1, .. })
    ));

    let config = PackerConfig {
        target_height: 0,
        ..PackerConfig::default()
    };
    assert!(matches!(
        TensorPacker::new(&config),
        Err(TensorError::InvalidDimension { .. })
    ));
}

#[test]
fn test_config_toml_round_trip() {
    let config = PackerConfig {
        target_width: 384,
        resize_mode: ResizeMode::Letterbox,
        ..PackerConfig::default()
    };
    let text = format!("[tensor]\n{}", toml::to_string(&config).unwrap());
    assert_eq!(PackerConfig::from_toml_str(&text).unwrap(), config);
}

#[test]
fn test_malformed_toml_has_context() {
    let err = PackerConfig::from_toml_str("[tensor\n").unwrap_err();
    assert!(err.to_string().contains("Failed to parse tensor configuration"));
}
