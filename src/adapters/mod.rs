// 對外部系統的具體實作：檔案落地、API Gateway 事件

pub mod gateway;
pub mod storage;
