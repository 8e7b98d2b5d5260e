mod property_savepoints;
