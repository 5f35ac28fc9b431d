pub mod train_spy_classifier;
